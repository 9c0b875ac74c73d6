use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::StoreError,
    inventory::service::{NewStock, Stock, StockPatch, StockStore, WarehouseSummary},
};

/// [`StockStore`] over the stocks table. Ownership always goes through the
/// owning warehouse's `user_id`, never a column on the stock itself.
#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn insert_stock(&self, user_id: i64, stock: &NewStock) -> Result<i64, StoreError> {
        // The EXISTS guard makes inserting into a foreign warehouse a no-op.
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO stocks (name, supplier, quantity, cost_price, purchase_date, stock_due_date, warehouse_id)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE EXISTS (
                SELECT 1 FROM warehouses WHERE id = $7 AND user_id = $8
            )
            RETURNING id
            "#,
        )
        .bind(&stock.name)
        .bind(&stock.supplier)
        .bind(stock.quantity)
        .bind(stock.cost_price)
        .bind(stock.purchase_date)
        .bind(stock.stock_due_date)
        .bind(stock.warehouse_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        id.ok_or(StoreError::NotFound)
    }

    async fn find_stock(&self, user_id: i64, stock_id: i64) -> Result<Option<Stock>, StoreError> {
        let stock = sqlx::query_as::<_, Stock>(
            r#"
            SELECT s.id, s.name, s.supplier, s.quantity, s.cost_price,
                   s.purchase_date, s.stock_due_date, s.warehouse_id
            FROM stocks s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE s.id = $1 AND w.user_id = $2
            "#,
        )
        .bind(stock_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(stock)
    }

    async fn list_stocks(&self, user_id: i64) -> Result<Vec<Stock>, StoreError> {
        let rows = sqlx::query_as::<_, Stock>(
            r#"
            SELECT s.id, s.name, s.supplier, s.quantity, s.cost_price,
                   s.purchase_date, s.stock_due_date, s.warehouse_id
            FROM stocks s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE w.user_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_warehouse_stocks(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Vec<Stock>, StoreError> {
        let rows = sqlx::query_as::<_, Stock>(
            r#"
            SELECT s.id, s.name, s.supplier, s.quantity, s.cost_price,
                   s.purchase_date, s.stock_due_date, s.warehouse_id
            FROM stocks s
            JOIN warehouses w ON w.id = s.warehouse_id
            WHERE w.id = $1 AND w.user_id = $2
            ORDER BY s.id
            "#,
        )
        .bind(warehouse_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_warehouse_summary(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Option<WarehouseSummary>, StoreError> {
        let row = sqlx::query_as::<_, WarehouseSummary>(
            r#"
            SELECT id, name, address
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

    async fn update_stock(
        &self,
        user_id: i64,
        stock_id: i64,
        patch: &StockPatch,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stocks s
            SET name = $1, supplier = $2, quantity = $3, cost_price = $4,
                purchase_date = $5, stock_due_date = $6
            FROM warehouses w
            WHERE s.id = $7 AND w.id = s.warehouse_id AND w.user_id = $8
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.supplier)
        .bind(patch.quantity)
        .bind(patch.cost_price)
        .bind(patch.purchase_date)
        .bind(patch.stock_due_date)
        .bind(stock_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_stock(&self, user_id: i64, stock_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM stocks s
            USING warehouses w
            WHERE s.id = $1 AND w.id = s.warehouse_id AND w.user_id = $2
            "#,
        )
        .bind(stock_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
