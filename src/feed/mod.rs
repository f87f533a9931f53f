//! Upstream change feed: turns database notifications into
//! [`crate::domain::ChangeEvent`]s for the mediator.

pub mod postgres;

pub use postgres::{PgChangeFeed, dispatch_notification};
