//! Health and status DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process can answer.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Whether the mediator currently has a broadcaster.
    pub broadcaster_attached: bool,
    /// Users holding at least one subscription.
    pub subscribed_users: usize,
    /// Open WebSocket connections.
    pub ws_connections: usize,
}
