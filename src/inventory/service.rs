use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    error::{ApiError, StoreError},
    inventory::dto::{StockView, WarehouseStocksData},
};

/// Stock row. Purchase and due dates are unix-millisecond timestamps, as the
/// clients send them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Stock {
    pub id: i64,
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub warehouse_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewStock {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub warehouse_id: i64,
}

#[derive(Debug, Clone)]
pub struct StockPatch {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WarehouseSummary {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Stock persistence, always scoped through the owning warehouse's
/// `user_id`. A stock in somebody else's warehouse is indistinguishable from
/// one that does not exist.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Inserts only when the target warehouse belongs to `user_id`;
    /// `StoreError::NotFound` otherwise.
    async fn insert_stock(&self, user_id: i64, stock: &NewStock) -> Result<i64, StoreError>;
    async fn find_stock(&self, user_id: i64, stock_id: i64) -> Result<Option<Stock>, StoreError>;
    async fn list_stocks(&self, user_id: i64) -> Result<Vec<Stock>, StoreError>;
    async fn list_warehouse_stocks(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Vec<Stock>, StoreError>;
    async fn find_warehouse_summary(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<Option<WarehouseSummary>, StoreError>;
    async fn update_stock(
        &self,
        user_id: i64,
        stock_id: i64,
        patch: &StockPatch,
    ) -> Result<(), StoreError>;
    async fn delete_stock(&self, user_id: i64, stock_id: i64) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("stock not found, enter the correct information then try again")]
    StockNotFound,
    #[error("warehouse not found, enter the correct information then try again")]
    WarehouseNotFound,
    #[error("store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::StockNotFound | InventoryError::WarehouseNotFound => {
                ApiError::not_found(err.to_string())
            }
            InventoryError::StoreUnavailable(source) => {
                error!(error = %source, "inventory store unavailable");
                ApiError::internal()
            }
        }
    }
}

pub struct InventoryService<S> {
    store: S,
}

impl<S: StockStore> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a stock in one of the caller's warehouses and returns that
    /// warehouse's refreshed stock list.
    pub async fn create_stock(
        &self,
        user_id: i64,
        stock: NewStock,
    ) -> Result<WarehouseStocksData, InventoryError> {
        let warehouse_id = stock.warehouse_id;
        let stock_id = match self.store.insert_stock(user_id, &stock).await {
            Ok(id) => id,
            Err(StoreError::NotFound) => return Err(InventoryError::WarehouseNotFound),
            Err(e) => return Err(InventoryError::StoreUnavailable(e)),
        };
        info!(user_id, stock_id, warehouse_id, "stock created");
        self.warehouse_stocks(user_id, warehouse_id).await
    }

    pub async fn get_stock(&self, user_id: i64, stock_id: i64) -> Result<StockView, InventoryError> {
        let stock = match self.store.find_stock(user_id, stock_id).await {
            Ok(stock) => stock,
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(InventoryError::StoreUnavailable(e)),
        };
        stock.map(StockView::from).ok_or(InventoryError::StockNotFound)
    }

    pub async fn list_stocks(&self, user_id: i64) -> Result<Vec<StockView>, InventoryError> {
        let stocks = self
            .store
            .list_stocks(user_id)
            .await
            .map_err(InventoryError::StoreUnavailable)?;
        Ok(stocks.into_iter().map(StockView::from).collect())
    }

    /// One warehouse plus its stocks. The warehouse lookup runs first so an
    /// empty listing still distinguishes "no stocks yet" from "not yours".
    pub async fn warehouse_stocks(
        &self,
        user_id: i64,
        warehouse_id: i64,
    ) -> Result<WarehouseStocksData, InventoryError> {
        let warehouse = match self.store.find_warehouse_summary(user_id, warehouse_id).await {
            Ok(Some(w)) => w,
            Ok(None) | Err(StoreError::NotFound) => return Err(InventoryError::WarehouseNotFound),
            Err(e) => return Err(InventoryError::StoreUnavailable(e)),
        };
        let stocks = self
            .store
            .list_warehouse_stocks(user_id, warehouse_id)
            .await
            .map_err(InventoryError::StoreUnavailable)?;
        Ok(WarehouseStocksData {
            warehouse,
            stocks: stocks.into_iter().map(StockView::from).collect(),
        })
    }

    pub async fn update_stock(
        &self,
        user_id: i64,
        stock_id: i64,
        patch: StockPatch,
    ) -> Result<StockView, InventoryError> {
        match self.store.update_stock(user_id, stock_id, &patch).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => return Err(InventoryError::StockNotFound),
            Err(e) => return Err(InventoryError::StoreUnavailable(e)),
        }
        info!(user_id, stock_id, "stock updated");
        self.get_stock(user_id, stock_id).await
    }

    pub async fn delete_stock(&self, user_id: i64, stock_id: i64) -> Result<(), InventoryError> {
        match self.store.delete_stock(user_id, stock_id).await {
            Ok(()) => {
                info!(user_id, stock_id, "stock deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(InventoryError::StockNotFound),
            Err(e) => Err(InventoryError::StoreUnavailable(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockStore {
        warehouses: Vec<(i64, WarehouseSummary)>,
        stocks: Mutex<Vec<(i64, Stock)>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                warehouses: vec![
                    (
                        1,
                        WarehouseSummary {
                            id: 10,
                            name: "alice main".into(),
                            address: "dock 1".into(),
                        },
                    ),
                    (
                        2,
                        WarehouseSummary {
                            id: 20,
                            name: "bob main".into(),
                            address: "dock 2".into(),
                        },
                    ),
                ],
                stocks: Mutex::new(Vec::new()),
            }
        }

        fn owns_warehouse(&self, user_id: i64, warehouse_id: i64) -> bool {
            self.warehouses
                .iter()
                .any(|(owner, w)| *owner == user_id && w.id == warehouse_id)
        }
    }

    fn new_stock(warehouse_id: i64) -> NewStock {
        NewStock {
            name: "beans".into(),
            supplier: "acme".into(),
            quantity: 4,
            cost_price: 250,
            purchase_date: 1_700_000_000_000,
            stock_due_date: 1_800_000_000_000,
            warehouse_id,
        }
    }

    #[async_trait]
    impl StockStore for MockStore {
        async fn insert_stock(&self, user_id: i64, stock: &NewStock) -> Result<i64, StoreError> {
            if !self.owns_warehouse(user_id, stock.warehouse_id) {
                return Err(StoreError::NotFound);
            }
            let mut stocks = self.stocks.lock().unwrap();
            let id = stocks.len() as i64 + 1;
            stocks.push((
                user_id,
                Stock {
                    id,
                    name: stock.name.clone(),
                    supplier: stock.supplier.clone(),
                    quantity: stock.quantity,
                    cost_price: stock.cost_price,
                    purchase_date: stock.purchase_date,
                    stock_due_date: stock.stock_due_date,
                    warehouse_id: stock.warehouse_id,
                },
            ));
            Ok(id)
        }

        async fn find_stock(
            &self,
            user_id: i64,
            stock_id: i64,
        ) -> Result<Option<Stock>, StoreError> {
            Ok(self
                .stocks
                .lock()
                .unwrap()
                .iter()
                .find(|(owner, s)| *owner == user_id && s.id == stock_id)
                .map(|(_, s)| s.clone()))
        }

        async fn list_stocks(&self, user_id: i64) -> Result<Vec<Stock>, StoreError> {
            Ok(self
                .stocks
                .lock()
                .unwrap()
                .iter()
                .filter(|(owner, _)| *owner == user_id)
                .map(|(_, s)| s.clone())
                .collect())
        }

        async fn list_warehouse_stocks(
            &self,
            user_id: i64,
            warehouse_id: i64,
        ) -> Result<Vec<Stock>, StoreError> {
            Ok(self
                .stocks
                .lock()
                .unwrap()
                .iter()
                .filter(|(owner, s)| *owner == user_id && s.warehouse_id == warehouse_id)
                .map(|(_, s)| s.clone())
                .collect())
        }

        async fn find_warehouse_summary(
            &self,
            user_id: i64,
            warehouse_id: i64,
        ) -> Result<Option<WarehouseSummary>, StoreError> {
            Ok(self
                .warehouses
                .iter()
                .find(|(owner, w)| *owner == user_id && w.id == warehouse_id)
                .map(|(_, w)| w.clone()))
        }

        async fn update_stock(
            &self,
            user_id: i64,
            stock_id: i64,
            patch: &StockPatch,
        ) -> Result<(), StoreError> {
            let mut stocks = self.stocks.lock().unwrap();
            match stocks
                .iter_mut()
                .find(|(owner, s)| *owner == user_id && s.id == stock_id)
            {
                Some((_, s)) => {
                    s.name = patch.name.clone();
                    s.supplier = patch.supplier.clone();
                    s.quantity = patch.quantity;
                    s.cost_price = patch.cost_price;
                    s.purchase_date = patch.purchase_date;
                    s.stock_due_date = patch.stock_due_date;
                    Ok(())
                }
                None => Err(StoreError::NotFound),
            }
        }

        async fn delete_stock(&self, user_id: i64, stock_id: i64) -> Result<(), StoreError> {
            let mut stocks = self.stocks.lock().unwrap();
            let before = stocks.len();
            stocks.retain(|(owner, s)| !(*owner == user_id && s.id == stock_id));
            if stocks.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_stock_in_own_warehouse_returns_listing_with_amount() {
        let svc = InventoryService::new(MockStore::new());
        let data = svc.create_stock(1, new_stock(10)).await.expect("create");
        assert_eq!(data.warehouse.id, 10);
        assert_eq!(data.stocks.len(), 1);
        assert_eq!(data.stocks[0].amount, 4 * 250);
    }

    #[tokio::test]
    async fn create_stock_in_foreign_warehouse_is_not_found() {
        let svc = InventoryService::new(MockStore::new());
        let err = svc.create_stock(1, new_stock(20)).await.unwrap_err();
        assert!(matches!(err, InventoryError::WarehouseNotFound));
        assert!(svc.store.stocks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_and_missing_stocks_are_equally_not_found() {
        let svc = InventoryService::new(MockStore::new());
        svc.create_stock(2, new_stock(20)).await.expect("create");

        let foreign = svc.get_stock(1, 1).await.unwrap_err();
        let missing = svc.get_stock(1, 999).await.unwrap_err();
        assert!(matches!(foreign, InventoryError::StockNotFound));
        assert!(matches!(missing, InventoryError::StockNotFound));
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn update_respects_ownership_and_returns_fresh_view() {
        let svc = InventoryService::new(MockStore::new());
        svc.create_stock(1, new_stock(10)).await.expect("create");

        let patch = StockPatch {
            name: "beans".into(),
            supplier: "acme".into(),
            quantity: 7,
            cost_price: 300,
            purchase_date: 1_700_000_000_000,
            stock_due_date: 1_800_000_000_000,
        };
        let err = svc.update_stock(2, 1, patch.clone()).await.unwrap_err();
        assert!(matches!(err, InventoryError::StockNotFound));

        let view = svc.update_stock(1, 1, patch).await.expect("owner update");
        assert_eq!(view.quantity, 7);
        assert_eq!(view.amount, 7 * 300);
    }

    #[tokio::test]
    async fn delete_is_scoped_and_not_repeatable() {
        let svc = InventoryService::new(MockStore::new());
        svc.create_stock(1, new_stock(10)).await.expect("create");

        let err = svc.delete_stock(2, 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::StockNotFound));

        svc.delete_stock(1, 1).await.expect("owner delete");
        let err = svc.delete_stock(1, 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::StockNotFound));
    }

    #[tokio::test]
    async fn warehouse_stocks_for_empty_owned_warehouse_succeeds() {
        let svc = InventoryService::new(MockStore::new());
        let data = svc.warehouse_stocks(1, 10).await.expect("owned warehouse");
        assert!(data.stocks.is_empty());

        let err = svc.warehouse_stocks(1, 20).await.unwrap_err();
        assert!(matches!(err, InventoryError::WarehouseNotFound));
    }
}
