use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    auth::{
        password::hash_password,
        service::LoginOutcome,
        token::{Identity, TokenKeys},
    },
    error::{ApiError, StoreError},
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user and returns the new id. `StoreError::Duplicate` when
    /// the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<UserProfile>, StoreError>;
    async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("username already exists")]
    UsernameTaken,
    #[error("user not found")]
    NotFound,
    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match &err {
            UserError::UsernameTaken => ApiError::bad_request(err.to_string()),
            UserError::NotFound => ApiError::not_found(err.to_string()),
            UserError::StoreUnavailable(source) => {
                error!(error = %source, "user store unavailable");
                ApiError::internal()
            }
            UserError::Internal(source) => {
                error!(error = %source, "user internal error");
                ApiError::internal()
            }
        }
    }
}

pub struct UserService<S> {
    store: S,
    keys: TokenKeys,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S, keys: TokenKeys) -> Self {
        Self { store, keys }
    }

    /// Creates the user and opens their first session: same token pair and
    /// refresh-token persistence as a login.
    pub async fn register(&self, username: &str, password: &str) -> Result<LoginOutcome, UserError> {
        let password_hash = hash_password(password).map_err(UserError::Internal)?;
        let user_id = match self.store.create_user(username, &password_hash).await {
            Ok(id) => id,
            Err(StoreError::Duplicate) => return Err(UserError::UsernameTaken),
            Err(e) => return Err(UserError::StoreUnavailable(e)),
        };

        let identity = Identity {
            user_id,
            username: username.to_owned(),
        };
        let access_token = self.keys.sign_access(&identity).map_err(UserError::Internal)?;
        let refresh_token = self
            .keys
            .sign_refresh(&identity)
            .map_err(UserError::Internal)?;
        self.store
            .store_refresh_token(user_id, &refresh_token)
            .await
            .map_err(UserError::StoreUnavailable)?;

        info!(user_id, username, "user registered");
        Ok(LoginOutcome {
            identity,
            access_token,
            refresh_token,
        })
    }

    pub async fn get_user(&self, id: i64) -> Result<UserProfile, UserError> {
        let user = match self.store.find_user_by_id(id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(UserError::StoreUnavailable(e)),
        };
        user.ok_or(UserError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::config::JwtConfig;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        users: Mutex<Vec<(i64, String, String)>>,
        tokens: Mutex<HashMap<i64, String>>,
    }

    #[async_trait]
    impl UserStore for MockStore {
        async fn create_user(
            &self,
            username: &str,
            password_hash: &str,
        ) -> Result<i64, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|(_, name, _)| name == username) {
                return Err(StoreError::Duplicate);
            }
            let id = users.len() as i64 + 1;
            users.push((id, username.into(), password_hash.into()));
            Ok(id)
        }

        async fn find_user_by_id(&self, id: i64) -> Result<Option<UserProfile>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|(user_id, _, _)| *user_id == id)
                .map(|(id, username, _)| UserProfile {
                    id: *id,
                    username: username.clone(),
                }))
        }

        async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
            self.tokens.lock().unwrap().insert(user_id, token.into());
            Ok(())
        }
    }

    fn service() -> UserService<MockStore> {
        UserService::new(MockStore::default(), TokenKeys::from(&JwtConfig::for_tests()))
    }

    #[tokio::test]
    async fn register_creates_user_and_opens_session() {
        let svc = service();
        let out = svc.register("bob", "hunter2hunter2").await.expect("register");
        assert_eq!(out.identity.username, "bob");

        let keys = TokenKeys::from(&JwtConfig::for_tests());
        assert_eq!(
            keys.verify_access(&out.access_token).unwrap().identity(),
            out.identity
        );
        assert_eq!(
            svc.store.tokens.lock().unwrap().get(&out.identity.user_id),
            Some(&out.refresh_token)
        );

        let stored_hash = svc.store.users.lock().unwrap()[0].2.clone();
        assert!(verify_password("hunter2hunter2", &stored_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let svc = service();
        svc.register("bob", "hunter2hunter2").await.expect("register");
        let err = svc.register("bob", "another-password").await.unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken));
        assert_eq!(err.to_string(), "username already exists");
    }

    #[tokio::test]
    async fn get_user_reports_not_found() {
        let svc = service();
        let err = svc.get_user(42).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }
}
