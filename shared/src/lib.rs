//! Shared types for the mesa dashboard
//!
//! Domain models and the push-event taxonomy used by the reconciliation
//! client. All types here are plain serde data; no I/O lives in this crate.

pub mod event;
pub mod models;

// Re-exports
pub use event::{EventParseError, PushEvent};
pub use models::{
    Cart, CartLine, Category, Destination, ItemStatus, NewOrder, NewOrderItem, NewTable, Order,
    OrderItem, OrderStatus, OrderUpdate, Product, ProductSnapshot, Staff, Table, TableStatus,
};
