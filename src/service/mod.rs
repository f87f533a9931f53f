//! Service layer: change routing.
//!
//! [`ChangeMediator`] validates incoming change events, delivers them
//! through the attached [`crate::domain::Broadcaster`], and owns the
//! subscription registry the transport layer updates.

pub mod change_mediator;

pub use change_mediator::{ChangeMediator, Delivery, DispatchOutcome};
