//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order aggregate status
///
/// `Completed` and `Archive` are set only by explicit staff action or the
/// backend; the kitchen states are derived from item statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    Completed,
    Archive,
}

impl OrderStatus {
    /// Kitchen states may be recomputed from items; Completed/Archive never regress.
    pub fn is_kitchen_state(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Cooking | OrderStatus::Ready
        )
    }
}

/// Item-level kitchen status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
}

/// Product snapshot embedded in an order item at the time of adding
///
/// The price is frozen here for historical correctness; it must never be
/// re-fetched from the catalog when rendering archived orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    /// Price in currency unit at the time of add
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

/// One product line within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Backend-assigned id; absent for optimistic local-only items
    pub id: Option<i64>,
    pub product_id: i64,
    pub product: ProductSnapshot,
    pub count: i32,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.count as f64
    }
}

/// Order entity
///
/// Exactly one of `table_id` / `carrier_number` is meaningful: dine-in
/// orders reference a table, delivery orders carry a phone contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_number: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    /// Service-fee percent applied at render/print time (`uslug` on the wire)
    #[serde(default, alias = "uslug")]
    pub commission_percent: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_dine_in(&self) -> bool {
        self.table_id.is_some()
    }

    pub fn is_delivery(&self) -> bool {
        self.table_id.is_none()
            && self
                .carrier_number
                .as_deref()
                .is_some_and(|c| !c.is_empty())
    }

    /// Archived orders are excluded from active operational views
    pub fn is_active(&self) -> bool {
        self.status != OrderStatus::Archive
    }

    /// Sum of item line totals, before service fee
    pub fn items_total(&self) -> f64 {
        self.order_items.iter().map(OrderItem::line_total).sum()
    }

    /// Total with the service-fee percent applied
    pub fn total_with_commission(&self) -> f64 {
        self.items_total() * (1.0 + self.commission_percent / 100.0)
    }
}

/// Destination of a new order
///
/// Expresses the tableId-XOR-carrierNumber invariant as a sum type instead
/// of two independently nullable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    DineIn { table_id: i64 },
    Delivery { carrier_number: String },
}

/// Create-order request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_number: Option<String>,
    pub order_items: Vec<NewOrderItem>,
}

/// One line of a create-order or add-item request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: i64,
    pub count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial order update (PATCH body)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn table(table_id: i64) -> Self {
        Self {
            table_id: Some(table_id),
            ..Self::default()
        }
    }
}
