use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::token::{Identity, TokenKeys},
    error::ApiError,
};

/// Extracts and validates the bearer access token, handing the embedded
/// identity to the handler as explicit context.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("invalid Authorization header"))?;

        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            ApiError::unauthorized("invalid or expired token")
        })?;

        Ok(AuthUser(claims.identity()))
    }
}
