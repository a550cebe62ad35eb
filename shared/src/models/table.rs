//! Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
///
/// Invariant: `Busy` iff at least one non-archived order references the
/// table. The reconciliation core recomputes this after every mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Empty,
    Busy,
}

/// Physical seating unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    /// Zone/place name (e.g. "Hall 1")
    pub name: String,
    /// Seat label within the zone
    pub number: String,
    #[serde(default)]
    pub status: TableStatus,
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTable {
    pub name: String,
    pub number: String,
}
