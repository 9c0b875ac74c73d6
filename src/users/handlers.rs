use axum::{
    extract::{FromRef, Path, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginData, PublicUser},
        extractors::AuthUser,
        token::TokenKeys,
    },
    error::{ApiError, ApiSuccess},
    state::AppState,
    users::{
        repo::PgUserStore,
        service::{UserProfile, UserService},
    },
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,30}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/users", get(me))
        .route("/users/:id", get(get_user))
}

fn user_service(state: &AppState) -> UserService<PgUserStore> {
    UserService::new(
        PgUserStore::new(state.db.clone()),
        TokenKeys::from_ref(state),
    )
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiSuccess<LoginData>>, ApiError> {
    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::bad_request(
            "username must be 3-30 characters of letters, digits or underscores",
        ));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::bad_request("password too short"));
    }

    let outcome = user_service(&state)
        .register(&payload.username, &payload.password)
        .await?;
    Ok(ApiSuccess::new(LoginData {
        user: PublicUser::from(&outcome.identity),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// Current user, straight from the verified access token.
#[instrument(skip_all)]
async fn me(AuthUser(identity): AuthUser) -> Json<ApiSuccess<PublicUser>> {
    ApiSuccess::new(PublicUser::from(&identity))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiSuccess<UserProfile>>, ApiError> {
    let user = user_service(&state).get_user(id).await?;
    Ok(ApiSuccess::new(user))
}
