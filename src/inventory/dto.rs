use serde::{Deserialize, Serialize};

use crate::inventory::service::{NewStock, Stock, StockPatch, WarehouseSummary};

#[derive(Debug, Deserialize)]
pub struct CreateStockRequest {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub warehouse_id: i64,
}

impl From<CreateStockRequest> for NewStock {
    fn from(req: CreateStockRequest) -> Self {
        Self {
            name: req.name,
            supplier: req.supplier,
            quantity: req.quantity,
            cost_price: req.cost_price,
            purchase_date: req.purchase_date,
            stock_due_date: req.stock_due_date,
            warehouse_id: req.warehouse_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
}

impl From<UpdateStockRequest> for StockPatch {
    fn from(req: UpdateStockRequest) -> Self {
        Self {
            name: req.name,
            supplier: req.supplier,
            quantity: req.quantity,
            cost_price: req.cost_price,
            purchase_date: req.purchase_date,
            stock_due_date: req.stock_due_date,
        }
    }
}

/// Stock as clients see it; `amount` is the derived line total.
#[derive(Debug, Serialize)]
pub struct StockView {
    pub id: i64,
    pub name: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_price: i64,
    pub purchase_date: i64,
    pub stock_due_date: i64,
    pub amount: i64,
}

impl From<Stock> for StockView {
    fn from(stock: Stock) -> Self {
        Self {
            id: stock.id,
            name: stock.name,
            supplier: stock.supplier,
            quantity: stock.quantity,
            cost_price: stock.cost_price,
            purchase_date: stock.purchase_date,
            stock_due_date: stock.stock_due_date,
            amount: stock.cost_price * stock.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WarehouseStocksData {
    pub warehouse: WarehouseSummary,
    pub stocks: Vec<StockView>,
}

#[derive(Debug, Serialize)]
pub struct StockData {
    pub stocks: StockView,
}

#[derive(Debug, Serialize)]
pub struct StockListData {
    pub stocks: Vec<StockView>,
}
