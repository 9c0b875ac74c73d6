use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiSuccess},
    inventory::{
        dto::{
            CreateStockRequest, StockData, StockListData, UpdateStockRequest, WarehouseStocksData,
        },
        repo::PgStockStore,
        service::InventoryService,
    },
    state::AppState,
};

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/stocks", post(create).get(list))
        .route("/stocks/:id", get(get_one).put(update).delete(remove))
}

pub(crate) fn inventory_service(state: &AppState) -> InventoryService<PgStockStore> {
    InventoryService::new(PgStockStore::new(state.db.clone()))
}

#[instrument(skip(state, payload))]
async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateStockRequest>,
) -> Result<Json<ApiSuccess<WarehouseStocksData>>, ApiError> {
    let data = inventory_service(&state)
        .create_stock(identity.user_id, payload.into())
        .await?;
    Ok(ApiSuccess::new(data))
}

#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiSuccess<StockListData>>, ApiError> {
    let stocks = inventory_service(&state)
        .list_stocks(identity.user_id)
        .await?;
    Ok(ApiSuccess::new(StockListData { stocks }))
}

#[instrument(skip(state))]
async fn get_one(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<StockData>>, ApiError> {
    let stock = inventory_service(&state)
        .get_stock(identity.user_id, id)
        .await?;
    Ok(ApiSuccess::new(StockData { stocks: stock }))
}

#[instrument(skip(state, payload))]
async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStockRequest>,
) -> Result<Json<ApiSuccess<StockData>>, ApiError> {
    let stock = inventory_service(&state)
        .update_stock(identity.user_id, id, payload.into())
        .await?;
    Ok(ApiSuccess::new(StockData { stocks: stock }))
}

#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<serde_json::Value>>, ApiError> {
    inventory_service(&state)
        .delete_stock(identity.user_id, id)
        .await?;
    Ok(ApiSuccess::new(json!({ "id": id })))
}
