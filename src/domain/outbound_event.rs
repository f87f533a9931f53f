//! Transport-level deliveries produced by the WebSocket broadcaster.
//!
//! Every [`super::Broadcaster`] call on the WebSocket transport becomes one
//! [`OutboundEvent`] on the [`super::EventBus`]. Each connection decides for
//! itself whether the event's [`DeliveryTarget`] addresses it.

use serde::Serialize;

/// Addressing mode of a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DeliveryTarget {
    /// Every connection authenticated as this user.
    User(String),
    /// Every connection subscribed to this table.
    Table(String),
}

/// A named event addressed to a user or to a table's subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEvent {
    /// Who should receive the event.
    pub target: DeliveryTarget,
    /// Wire event name, e.g. `"goals:update"`.
    pub event_name: String,
    /// Row payload, forwarded as-is.
    pub payload: serde_json::Value,
}

impl OutboundEvent {
    /// Creates a delivery for a single user's connections.
    #[must_use]
    pub fn to_user(user_id: &str, event_name: &str, payload: &serde_json::Value) -> Self {
        Self {
            target: DeliveryTarget::User(user_id.to_string()),
            event_name: event_name.to_string(),
            payload: payload.clone(),
        }
    }

    /// Creates a delivery for a table's subscribers.
    #[must_use]
    pub fn to_table(table: &str, event_name: &str, payload: &serde_json::Value) -> Self {
        Self {
            target: DeliveryTarget::Table(table.to_string()),
            event_name: event_name.to_string(),
            payload: payload.clone(),
        }
    }

    /// Client-facing body: `{"event": <name>, "data": <payload>}`.
    #[must_use]
    pub fn client_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "event": self.event_name,
            "data": self.payload,
        })
    }
}
