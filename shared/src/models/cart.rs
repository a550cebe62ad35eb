//! Cart - ephemeral order composition state
//!
//! Owned exclusively by the screen composing a new order or editing an
//! existing one; never persisted and never shared between screens.

use serde::{Deserialize, Serialize};

use super::{Destination, NewOrder, NewOrderItem, ProductSnapshot};

/// One composed line: product snapshot, quantity, optional kitchen note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub count: i32,
    pub description: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.count as f64
    }
}

/// Ordered mapping of product id to cart line
///
/// Insertion order is preserved; adding a product already present
/// increments its count instead of duplicating the line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: ProductSnapshot, count: i32, description: Option<String>) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.count += count;
            if description.is_some() {
                line.description = description;
            }
        } else {
            self.lines.push(CartLine {
                product,
                count,
                description,
            });
        }
    }

    /// Set the count of an existing line; a count of zero removes the line
    pub fn set_count(&mut self, product_id: i64, count: i32) {
        if count <= 0 {
            self.remove(product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.count = count;
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Build the create-order request body for the given destination
    pub fn to_new_order(&self, destination: &Destination) -> NewOrder {
        let (table_id, carrier_number) = match destination {
            Destination::DineIn { table_id } => (Some(*table_id), None),
            Destination::Delivery { carrier_number } => (None, Some(carrier_number.clone())),
        };
        NewOrder {
            table_id,
            carrier_number,
            order_items: self
                .lines
                .iter()
                .map(|l| NewOrderItem {
                    product_id: l.product.id,
                    count: l.count,
                    description: l.description.clone(),
                })
                .collect(),
        }
    }
}
