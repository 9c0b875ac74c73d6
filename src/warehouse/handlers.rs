use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiSuccess},
    inventory,
    state::AppState,
    warehouse::{
        repo::PgWarehouseStore,
        service::{Warehouse, WarehouseInput, WarehouseService},
    },
};

#[derive(Debug, Deserialize)]
pub struct WarehouseRequest {
    pub name: String,
    pub address: String,
}

impl From<WarehouseRequest> for WarehouseInput {
    fn from(req: WarehouseRequest) -> Self {
        Self {
            name: req.name,
            address: req.address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WarehouseListData {
    pub warehouses: Vec<Warehouse>,
}

#[derive(Debug, Serialize)]
pub struct WarehouseData {
    pub warehouse: Warehouse,
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/warehouses", post(create).get(list))
        .route(
            "/warehouses/:id",
            get(get_one).put(update).delete(remove),
        )
        .route("/warehouses/:id/stocks", get(stocks))
}

fn warehouse_service(state: &AppState) -> WarehouseService<PgWarehouseStore> {
    WarehouseService::new(PgWarehouseStore::new(state.db.clone()))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<WarehouseRequest>,
) -> Result<Json<ApiSuccess<WarehouseListData>>, ApiError> {
    let warehouses = warehouse_service(&state)
        .create(identity.user_id, payload.into())
        .await?;
    Ok(ApiSuccess::new(WarehouseListData { warehouses }))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiSuccess<WarehouseListData>>, ApiError> {
    let warehouses = warehouse_service(&state).list(identity.user_id).await?;
    Ok(ApiSuccess::new(WarehouseListData { warehouses }))
}

#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<WarehouseData>>, ApiError> {
    let warehouse = warehouse_service(&state).get(identity.user_id, id).await?;
    Ok(ApiSuccess::new(WarehouseData { warehouse }))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<WarehouseRequest>,
) -> Result<Json<ApiSuccess<WarehouseData>>, ApiError> {
    let warehouse = warehouse_service(&state)
        .update(identity.user_id, id, payload.into())
        .await?;
    Ok(ApiSuccess::new(WarehouseData { warehouse }))
}

#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<serde_json::Value>>, ApiError> {
    warehouse_service(&state).delete(identity.user_id, id).await?;
    Ok(ApiSuccess::new(json!({ "id": id })))
}

/// Stocks of one warehouse, scoped to the owner.
#[instrument(skip(state))]
async fn stocks(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<inventory::dto::WarehouseStocksData>>, ApiError> {
    let data = inventory::handlers::inventory_service(&state)
        .warehouse_stocks(identity.user_id, id)
        .await?;
    Ok(ApiSuccess::new(data))
}
