//! WebSocket layer: the relay's transport and [`crate::domain::Broadcaster`].
//!
//! The endpoint at `/ws` lets clients manage table subscriptions and
//! receive change deliveries. [`broadcaster::WsBroadcaster`] is the
//! broadcaster the mediator is wired to at startup.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;

pub use broadcaster::WsBroadcaster;
