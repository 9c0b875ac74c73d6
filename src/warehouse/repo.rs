use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::StoreError,
    warehouse::service::{Warehouse, WarehouseInput, WarehouseStore},
};

#[derive(Clone)]
pub struct PgWarehouseStore {
    db: PgPool,
}

impl PgWarehouseStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WarehouseStore for PgWarehouseStore {
    async fn insert_warehouse(
        &self,
        user_id: i64,
        input: &WarehouseInput,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO warehouses (name, address, user_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn list_warehouses(&self, user_id: i64) -> Result<Vec<Warehouse>, StoreError> {
        let rows = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, address, user_id
            FROM warehouses
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_warehouse(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Option<Warehouse>, StoreError> {
        let row = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, address, user_id
            FROM warehouses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_warehouse(
        &self,
        user_id: i64,
        warehouse_id: i64,
        input: &WarehouseInput,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE warehouses
            SET name = $1, address = $2
            WHERE id = $3 AND user_id = $4
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(warehouse_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_warehouse(&self, user_id: i64, warehouse_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM warehouses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
