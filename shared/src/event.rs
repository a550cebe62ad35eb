//! Push-event taxonomy
//!
//! Server-pushed notifications arrive as a `{ "event": ..., "data": ... }`
//! envelope. The backend is inconsistent about event naming (camelCase and
//! snake_case for the same logical event); this module normalizes both
//! spellings into one tagged union and fails closed on anything it does not
//! recognize, so malformed payloads never reach the store.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{ItemStatus, Order};

/// Raised when an envelope cannot be normalized into a [`PushEvent`]
#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("malformed event envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    #[error("invalid payload for {event}: {source}")]
    Payload {
        event: String,
        source: serde_json::Error,
    },
}

/// Wire envelope for push events
#[derive(Debug, Clone, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
    /// Server-side delivery timestamp (Unix milliseconds), when present
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDeletedPayload {
    #[serde(alias = "id", alias = "order_id")]
    order_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemStatusPayload {
    #[serde(alias = "id", alias = "item_id")]
    item_id: i64,
    status: ItemStatus,
}

/// Normalized push event
#[derive(Debug, Clone)]
pub enum PushEvent {
    Connected,
    Disconnected,
    OrderCreated(Order),
    OrderUpdated(Order),
    OrderDeleted {
        order_id: i64,
        timestamp: i64,
    },
    OrderItemStatusUpdated {
        item_id: i64,
        status: ItemStatus,
        timestamp: i64,
    },
}

impl PushEvent {
    /// Parse and normalize a raw envelope, failing closed on mismatch
    pub fn from_envelope(raw: &str) -> Result<Self, EventParseError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        let ts = envelope
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        match envelope.event.as_str() {
            "connect" => Ok(PushEvent::Connected),
            "disconnect" => Ok(PushEvent::Disconnected),
            "orderCreated" | "order_created" => {
                let order: Order =
                    serde_json::from_value(envelope.data).map_err(|source| {
                        EventParseError::Payload {
                            event: envelope.event.clone(),
                            source,
                        }
                    })?;
                Ok(PushEvent::OrderCreated(order))
            }
            "orderUpdated" | "order_updated" => {
                let order: Order =
                    serde_json::from_value(envelope.data).map_err(|source| {
                        EventParseError::Payload {
                            event: envelope.event.clone(),
                            source,
                        }
                    })?;
                Ok(PushEvent::OrderUpdated(order))
            }
            "orderDeleted" | "order_deleted" => {
                let payload: OrderDeletedPayload = serde_json::from_value(envelope.data)
                    .map_err(|source| EventParseError::Payload {
                        event: envelope.event.clone(),
                        source,
                    })?;
                Ok(PushEvent::OrderDeleted {
                    order_id: payload.order_id,
                    timestamp: ts,
                })
            }
            "orderItemStatusUpdated" | "order_item_status_updated" => {
                let payload: ItemStatusPayload = serde_json::from_value(envelope.data)
                    .map_err(|source| EventParseError::Payload {
                        event: envelope.event.clone(),
                        source,
                    })?;
                Ok(PushEvent::OrderItemStatusUpdated {
                    item_id: payload.item_id,
                    status: payload.status,
                    timestamp: ts,
                })
            }
            other => Err(EventParseError::UnknownEvent(other.to_string())),
        }
    }

    /// Canonical name of this event (the camelCase spelling)
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::Connected => "connect",
            PushEvent::Disconnected => "disconnect",
            PushEvent::OrderCreated(_) => "orderCreated",
            PushEvent::OrderUpdated(_) => "orderUpdated",
            PushEvent::OrderDeleted { .. } => "orderDeleted",
            PushEvent::OrderItemStatusUpdated { .. } => "orderItemStatusUpdated",
        }
    }

    /// Key used by the event deduplicator: `{event}:{entityId}:{timestamp}`
    ///
    /// Connection lifecycle events are not deduplicated and return `None`.
    pub fn dedup_key(&self) -> Option<String> {
        match self {
            PushEvent::Connected | PushEvent::Disconnected => None,
            PushEvent::OrderCreated(order) | PushEvent::OrderUpdated(order) => Some(format!(
                "{}:{}:{}",
                self.name(),
                order.id,
                order.updated_at.timestamp_millis()
            )),
            PushEvent::OrderDeleted {
                order_id,
                timestamp,
            } => Some(format!("{}:{}:{}", self.name(), order_id, timestamp)),
            PushEvent::OrderItemStatusUpdated {
                item_id, timestamp, ..
            } => Some(format!("{}:{}:{}", self.name(), item_id, timestamp)),
        }
    }
}
