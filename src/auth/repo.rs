use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    auth::service::{AuthStore, UserRecord},
    error::StoreError,
};

/// [`AuthStore`] over the users table. The `refresh_token` column holds the
/// single active refresh token per user; overwriting it is what invalidates
/// earlier sessions.
#[derive(Clone)]
pub struct PgAuthStore {
    db: PgPool,
}

impl PgAuthStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn refresh_token_for(&self, user_id: i64) -> Result<Option<String>, StoreError> {
        let token: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT refresh_token
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(token.flatten())
    }

    async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $1
            WHERE id = $2
            "#,
        )
        .bind(token)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
