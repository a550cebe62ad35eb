//! Staff Model

use serde::{Deserialize, Serialize};

/// Staff member entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
}
