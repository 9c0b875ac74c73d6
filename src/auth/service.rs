use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth::{
        password::verify_password,
        token::{Identity, TokenKeys},
    },
    error::{ApiError, StoreError},
};

/// The credential row as the store hands it out. The hash never leaves this
/// module.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// The two lookups and one write the session flow needs from the user-record
/// store. Kept as a trait so the service runs against an in-memory store in
/// tests.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, StoreError>;
    async fn refresh_token_for(&self, user_id: i64) -> Result<Option<String>, StoreError>;
    async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password collapse into this one variant so
    /// the two cases are indistinguishable from outside.
    #[error("username or password is incorrect")]
    CredentialInvalid,
    #[error("invalid refresh token")]
    RefreshInvalid,
    #[error("token not found")]
    RefreshMissing,
    #[error("invalid or expired token")]
    AccessInvalid,
    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::CredentialInvalid
            | AuthError::RefreshInvalid
            | AuthError::RefreshMissing
            | AuthError::AccessInvalid => ApiError::bad_request(err.to_string()),
            AuthError::StoreUnavailable(source) => {
                error!(error = %source, "auth store unavailable");
                ApiError::internal()
            }
            AuthError::Internal(source) => {
                error!(error = %source, "auth internal error");
                ApiError::internal()
            }
        }
    }
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct RefreshOutcome {
    pub identity: Identity,
    pub access_token: String,
}

/// Orchestrates login and refresh on top of an [`AuthStore`] and the token
/// keys. Stateless apart from the injected collaborators.
pub struct AuthService<S> {
    store: S,
    keys: TokenKeys,
}

impl<S: AuthStore> AuthService<S> {
    pub fn new(store: S, keys: TokenKeys) -> Self {
        Self { store, keys }
    }

    /// Verifies credentials and issues a fresh access/refresh pair. The new
    /// refresh token overwrites whatever was persisted before, which is the
    /// whole revocation story: one active refresh token per user, last login
    /// wins.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await
            .map_err(AuthError::StoreUnavailable)?;
        let Some(user) = user else {
            warn!(username, "login with unknown username");
            return Err(AuthError::CredentialInvalid);
        };

        let password_ok =
            verify_password(password, &user.password_hash).map_err(AuthError::Internal)?;
        if !password_ok {
            warn!(username, user_id = user.id, "login with wrong password");
            return Err(AuthError::CredentialInvalid);
        }

        let identity = Identity {
            user_id: user.id,
            username: user.username,
        };
        let access_token = self.keys.sign_access(&identity).map_err(AuthError::Internal)?;
        let refresh_token = self
            .keys
            .sign_refresh(&identity)
            .map_err(AuthError::Internal)?;
        self.store
            .store_refresh_token(identity.user_id, &refresh_token)
            .await
            .map_err(AuthError::StoreUnavailable)?;

        info!(user_id = identity.user_id, "user logged in");
        Ok(LoginOutcome {
            identity,
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new access token. Signature and expiry
    /// are checked before any store access; only the exact string persisted
    /// at the latest login is honored, so superseded tokens fail here no
    /// matter how valid their signature still is. The refresh token itself is
    /// not rotated.
    pub async fn refresh(&self, presented: &str) -> Result<RefreshOutcome, AuthError> {
        let claims = self.keys.verify_refresh(presented).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AuthError::RefreshInvalid
        })?;

        let persisted = match self.store.refresh_token_for(claims.sub).await {
            Ok(token) => token,
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(AuthError::StoreUnavailable(e)),
        };
        let Some(persisted) = persisted else {
            warn!(user_id = claims.sub, "no persisted refresh token");
            return Err(AuthError::RefreshMissing);
        };
        if persisted != presented {
            warn!(user_id = claims.sub, "refresh token superseded by a newer login");
            return Err(AuthError::RefreshInvalid);
        }

        let identity = claims.identity();
        let access_token = self.keys.sign_access(&identity).map_err(AuthError::Internal)?;
        info!(user_id = identity.user_id, "access token refreshed");
        Ok(RefreshOutcome {
            identity,
            access_token,
        })
    }

    /// Resolves a bearer access token to the identity it carries.
    pub fn authenticate(&self, access_token: &str) -> Result<Identity, AuthError> {
        let claims = self
            .keys
            .verify_access(access_token)
            .map_err(|_| AuthError::AccessInvalid)?;
        Ok(claims.identity())
    }
}
