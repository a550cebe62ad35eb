//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (catalog item)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in currency unit
    pub price: f64,
    #[serde(default)]
    pub image: String,
    pub category_id: i64,
    /// Out-of-stock flag; checked again at submit time, stale carts are not trusted
    #[serde(default)]
    pub is_finished: bool,
}

impl Product {
    /// Snapshot embedded into order items at add time
    pub fn snapshot(&self) -> super::ProductSnapshot {
        super::ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}
