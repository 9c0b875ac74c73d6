use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::error::{ApiError, StoreError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing)]
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct WarehouseInput {
    pub name: String,
    pub address: String,
}

/// Every operation takes the owning `user_id`; rows belonging to other users
/// are invisible, and a miss is plain `NotFound` either way.
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    async fn insert_warehouse(
        &self,
        user_id: i64,
        input: &WarehouseInput,
    ) -> Result<i64, StoreError>;
    async fn list_warehouses(&self, user_id: i64) -> Result<Vec<Warehouse>, StoreError>;
    async fn find_warehouse(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Option<Warehouse>, StoreError>;
    async fn update_warehouse(
        &self,
        user_id: i64,
        warehouse_id: i64,
        input: &WarehouseInput,
    ) -> Result<(), StoreError>;
    async fn delete_warehouse(&self, user_id: i64, warehouse_id: i64) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("warehouse not found, enter the correct information then try again")]
    NotFound,
    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl From<StoreError> for WarehouseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WarehouseError::NotFound,
            other => WarehouseError::StoreUnavailable(other),
        }
    }
}

impl From<WarehouseError> for ApiError {
    fn from(err: WarehouseError) -> Self {
        match &err {
            WarehouseError::NotFound => ApiError::not_found(err.to_string()),
            WarehouseError::StoreUnavailable(source) => {
                error!(error = %source, "warehouse store unavailable");
                ApiError::internal()
            }
        }
    }
}

pub struct WarehouseService<S> {
    store: S,
}

impl<S: WarehouseStore> WarehouseService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a warehouse and returns the owner's full list, matching the
    /// list endpoint's shape.
    pub async fn create(
        &self,
        user_id: i64,
        input: WarehouseInput,
    ) -> Result<Vec<Warehouse>, WarehouseError> {
        let warehouse_id = self.store.insert_warehouse(user_id, &input).await?;
        info!(user_id, warehouse_id, "warehouse created");
        Ok(self.store.list_warehouses(user_id).await?)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Warehouse>, WarehouseError> {
        Ok(self.store.list_warehouses(user_id).await?)
    }

    pub async fn get(&self, user_id: i64, warehouse_id: i64) -> Result<Warehouse, WarehouseError> {
        self.store
            .find_warehouse(user_id, warehouse_id)
            .await?
            .ok_or(WarehouseError::NotFound)
    }

    pub async fn update(
        &self,
        user_id: i64,
        warehouse_id: i64,
        input: WarehouseInput,
    ) -> Result<Warehouse, WarehouseError> {
        self.store
            .update_warehouse(user_id, warehouse_id, &input)
            .await?;
        info!(user_id, warehouse_id, "warehouse updated");
        self.get(user_id, warehouse_id).await
    }

    pub async fn delete(&self, user_id: i64, warehouse_id: i64) -> Result<(), WarehouseError> {
        self.store.delete_warehouse(user_id, warehouse_id).await?;
        info!(user_id, warehouse_id, "warehouse deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockStore {
        rows: Mutex<Vec<Warehouse>>,
    }

    impl MockStore {
        fn with_rows(rows: Vec<Warehouse>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }
    }

    fn owned_by(user_id: i64, id: i64) -> Warehouse {
        Warehouse {
            id,
            name: format!("warehouse-{id}"),
            address: "somewhere".into(),
            user_id,
        }
    }

    #[async_trait]
    impl WarehouseStore for MockStore {
        async fn insert_warehouse(
            &self,
            user_id: i64,
            input: &WarehouseInput,
        ) -> Result<i64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.iter().map(|w| w.id).max().unwrap_or(0) + 1;
            rows.push(Warehouse {
                id,
                name: input.name.clone(),
                address: input.address.clone(),
                user_id,
            });
            Ok(id)
        }

        async fn list_warehouses(&self, user_id: i64) -> Result<Vec<Warehouse>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|w| w.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn find_warehouse(
            &self,
            user_id: i64,
            warehouse_id: i64,
        ) -> Result<Option<Warehouse>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|w| w.id == warehouse_id && w.user_id == user_id)
                .cloned())
        }

        async fn update_warehouse(
            &self,
            user_id: i64,
            warehouse_id: i64,
            input: &WarehouseInput,
        ) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|w| w.id == warehouse_id && w.user_id == user_id)
            {
                Some(row) => {
                    row.name = input.name.clone();
                    row.address = input.address.clone();
                    Ok(())
                }
                None => Err(StoreError::NotFound),
            }
        }

        async fn delete_warehouse(
            &self,
            user_id: i64,
            warehouse_id: i64,
        ) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|w| !(w.id == warehouse_id && w.user_id == user_id));
            if rows.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn listing_only_shows_own_warehouses() {
        let svc = WarehouseService::new(MockStore::with_rows(vec![
            owned_by(1, 10),
            owned_by(2, 20),
        ]));
        let mine = svc.list(1).await.expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, 10);
    }

    #[tokio::test]
    async fn foreign_and_missing_warehouses_are_equally_not_found() {
        let svc = WarehouseService::new(MockStore::with_rows(vec![owned_by(2, 20)]));

        let foreign = svc.get(1, 20).await.unwrap_err();
        let missing = svc.get(1, 999).await.unwrap_err();
        assert!(matches!(foreign, WarehouseError::NotFound));
        assert!(matches!(missing, WarehouseError::NotFound));
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn update_and_delete_respect_ownership() {
        let svc = WarehouseService::new(MockStore::with_rows(vec![owned_by(2, 20)]));
        let input = WarehouseInput {
            name: "renamed".into(),
            address: "moved".into(),
        };

        let err = svc.update(1, 20, input.clone()).await.unwrap_err();
        assert!(matches!(err, WarehouseError::NotFound));
        let err = svc.delete(1, 20).await.unwrap_err();
        assert!(matches!(err, WarehouseError::NotFound));

        let updated = svc.update(2, 20, input).await.expect("owner can update");
        assert_eq!(updated.name, "renamed");
        svc.delete(2, 20).await.expect("owner can delete");
    }

    #[tokio::test]
    async fn create_returns_owner_listing() {
        let svc = WarehouseService::new(MockStore::with_rows(vec![owned_by(2, 20)]));
        let listing = svc
            .create(
                1,
                WarehouseInput {
                    name: "new".into(),
                    address: "addr".into(),
                },
            )
            .await
            .expect("create");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "new");
    }
}
