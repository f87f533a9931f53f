//! # change-relay
//!
//! Routes row-change events from a backing store's change feed to
//! connected real-time clients.
//!
//! Each change is delivered to the user who owns the row and to every user
//! subscribed to the row's table. The relay keeps subscriptions in memory
//! only; delivery is best-effort.
//!
//! ## Architecture
//!
//! ```text
//! PostgreSQL (NOTIFY)      HTTP POST /api/v1/changes
//!     │                          │
//!     ├── PgChangeFeed (feed/)   ├── REST Handlers (api/)
//!     │                          │
//!     └──────────┬───────────────┘
//!                │
//!         ChangeMediator (service/) ── SubscriptionRegistry (domain/)
//!                │
//!         Broadcaster ── WsBroadcaster (ws/) ── EventBus (domain/)
//!                                                  │
//!                                      WebSocket connections (ws/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full HTTP router: REST endpoints, `/ws`, tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
