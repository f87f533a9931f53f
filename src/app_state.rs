//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::ChangeMediator;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Change mediator: routing and subscription registry.
    pub mediator: Arc<ChangeMediator>,
    /// Event bus the WebSocket connections receive deliveries from.
    pub event_bus: EventBus,
}
