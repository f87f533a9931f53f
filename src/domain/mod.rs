//! Domain layer: change events, subscriptions, and delivery plumbing.
//!
//! This module contains the change event model, the per-user subscription
//! registry, the [`Broadcaster`] capability the mediator delivers through,
//! and the event bus the WebSocket transport fans deliveries out on.

pub mod broadcaster;
pub mod change_event;
pub mod event_bus;
pub mod outbound_event;
pub mod subscription_registry;

pub use broadcaster::Broadcaster;
pub use change_event::{ChangeAction, ChangeEvent};
pub use event_bus::EventBus;
pub use outbound_event::{DeliveryTarget, OutboundEvent};
pub use subscription_registry::SubscriptionRegistry;
