use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginData, LoginRequest, PublicUser, RefreshData, RefreshRequest},
        repo::PgAuthStore,
        service::AuthService,
        token::TokenKeys,
    },
    error::{ApiError, ApiSuccess},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

fn session_service(state: &AppState) -> AuthService<PgAuthStore> {
    AuthService::new(
        PgAuthStore::new(state.db.clone()),
        TokenKeys::from_ref(state),
    )
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiSuccess<LoginData>>, ApiError> {
    let outcome = session_service(&state)
        .login(&payload.username, &payload.password)
        .await?;
    Ok(ApiSuccess::new(LoginData {
        user: PublicUser::from(&outcome.identity),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiSuccess<RefreshData>>, ApiError> {
    let outcome = session_service(&state)
        .refresh(&payload.refresh_token)
        .await?;
    Ok(ApiSuccess::new(RefreshData {
        user: PublicUser::from(&outcome.identity),
        access_token: outcome.access_token,
    }))
}
