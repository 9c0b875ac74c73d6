use serde::{Deserialize, Serialize};

use crate::auth::token::Identity;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
}

impl From<&Identity> for PublicUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id,
            username: identity.username.clone(),
        }
    }
}

/// Data payload after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Data payload after a successful refresh. The refresh token is not rotated,
/// so only the new access token comes back.
#[derive(Debug, Serialize)]
pub struct RefreshData {
    pub user: PublicUser,
    pub access_token: String,
}
