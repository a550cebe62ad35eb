//! Backend seam
//!
//! The REST backend is an external collaborator; the reconciler only
//! depends on this trait so tests can drive it against an in-memory fake.

use async_trait::async_trait;

use shared::models::{
    Category, NewOrder, NewOrderItem, NewTable, Order, OrderUpdate, Product, Staff, Table,
    TableStatus,
};

use crate::error::ClientResult;

/// REST operations the reconciliation core relies on
///
/// Mutation endpoints return the full updated order so the caller can merge
/// the authoritative server state instead of trusting its optimistic copy.
#[async_trait]
pub trait Backend: Send + Sync {
    // ===== Snapshot loads =====

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>>;
    async fn fetch_tables(&self) -> ClientResult<Vec<Table>>;
    async fn fetch_products(&self) -> ClientResult<Vec<Product>>;
    async fn fetch_categories(&self) -> ClientResult<Vec<Category>>;
    async fn fetch_commission_percent(&self) -> ClientResult<f64>;
    async fn fetch_staff(&self) -> ClientResult<Vec<Staff>>;

    // ===== Order mutation =====

    async fn create_order(&self, body: &NewOrder) -> ClientResult<Order>;
    async fn update_order(&self, id: i64, body: &OrderUpdate) -> ClientResult<Order>;
    async fn add_order_item(&self, order_id: i64, item: &NewOrderItem) -> ClientResult<Order>;
    async fn delete_order(&self, id: i64) -> ClientResult<()>;
    async fn delete_order_item(&self, item_id: i64) -> ClientResult<Order>;

    // ===== Table mutation =====

    async fn set_table_status(&self, id: i64, status: TableStatus) -> ClientResult<()>;
    async fn create_table(&self, body: &NewTable) -> ClientResult<Table>;
    async fn delete_table(&self, id: i64) -> ClientResult<()>;
}
