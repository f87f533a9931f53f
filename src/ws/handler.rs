//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::RelayError;

/// Query parameters of the upgrade request.
///
/// `user_id` is set by the authenticating proxy in front of the relay.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Identity of the connecting user.
    #[serde(default)]
    pub user_id: String,
}

/// `GET /ws?user_id=<id>` — Upgrade HTTP connection to WebSocket.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] if `user_id` is missing or blank.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RelayError> {
    let user_id = params.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(RelayError::InvalidRequest(
            "user_id query parameter is required".to_string(),
        ));
    }

    let event_rx = state.event_bus.subscribe();
    let mediator = Arc::clone(&state.mediator);

    Ok(ws.on_upgrade(move |socket| run_connection(socket, user_id, event_rx, mediator)))
}
