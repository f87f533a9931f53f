//! Change mediator: routes change-feed events to the broadcaster.
//!
//! [`ChangeMediator`] is the only component that calls a [`Broadcaster`]
//! and the only one that mutates the [`SubscriptionRegistry`]. Each change
//! event turns into at most two deliveries: one to the owning user and one
//! to the subscribers of the changed table.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::domain::{Broadcaster, ChangeEvent, SubscriptionRegistry};
use crate::error::RelayError;

/// Result of a single broadcast call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Delivery {
    /// The transport accepted the message.
    Delivered,
    /// The transport rejected the message; carries the error text.
    Failed(String),
}

impl Delivery {
    fn from_result(result: Result<(), RelayError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Returns `true` for [`Delivery::Delivered`].
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// What [`ChangeMediator::handle_change`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// No broadcaster was attached; the event was dropped.
    Skipped {
        /// Event name that would have been used.
        event_name: String,
    },
    /// The event was handed to the broadcaster.
    Dispatched {
        /// Wire event name, `"<table>:<action>"`.
        event_name: String,
        /// Owner delivery, absent for unattributed events.
        user: Option<Delivery>,
        /// Table subscriber delivery.
        table: Delivery,
    },
}

/// Routes change events to the attached [`Broadcaster`] and owns the
/// subscription registry.
///
/// # Concurrency
///
/// - `handle_change` takes `&self` and may run concurrently with itself and
///   with subscription changes.
/// - The broadcaster handle sits behind a [`RwLock`]; a dispatch clones the
///   current [`Arc`] and releases the lock before any I/O, so it observes
///   either the old or the new broadcaster, never a mix.
#[derive(Debug, Default)]
pub struct ChangeMediator {
    registry: SubscriptionRegistry,
    broadcaster: RwLock<Option<Arc<dyn Broadcaster>>>,
}

impl ChangeMediator {
    /// Creates a mediator with an empty registry and no broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mediator that takes ownership of an existing registry.
    #[must_use]
    pub fn with_registry(registry: SubscriptionRegistry) -> Self {
        Self {
            registry,
            broadcaster: RwLock::new(None),
        }
    }

    /// Attaches `broadcaster`, replacing any previous one.
    ///
    /// Returns the broadcaster that was replaced, if any.
    pub async fn set_broadcaster(
        &self,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Option<Arc<dyn Broadcaster>> {
        let previous = self.broadcaster.write().await.replace(broadcaster);
        if previous.is_some() {
            tracing::info!("broadcaster replaced");
        } else {
            tracing::info!("broadcaster attached");
        }
        previous
    }

    /// Detaches the current broadcaster. Subsequent changes are dropped
    /// until a new one is attached.
    pub async fn detach_broadcaster(&self) -> Option<Arc<dyn Broadcaster>> {
        let previous = self.broadcaster.write().await.take();
        if previous.is_some() {
            tracing::info!("broadcaster detached");
        }
        previous
    }

    /// Returns `true` if a broadcaster is attached.
    pub async fn has_broadcaster(&self) -> bool {
        self.broadcaster.read().await.is_some()
    }

    async fn current_broadcaster(&self) -> Option<Arc<dyn Broadcaster>> {
        self.broadcaster.read().await.as_ref().map(Arc::clone)
    }

    /// Routes one change event.
    ///
    /// Delivers to the owning user first (when the event has one), then to
    /// the table's subscribers. A user may receive both. A failed delivery
    /// is logged and recorded in the outcome; it never stops the other
    /// delivery and never becomes an `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidEvent`] if the event's table is empty
    /// or would produce an ambiguous event name.
    pub async fn handle_change(&self, event: &ChangeEvent) -> Result<DispatchOutcome, RelayError> {
        event.validate()?;
        let event_name = event.event_name();

        let Some(broadcaster) = self.current_broadcaster().await else {
            tracing::warn!(
                table = %event.table,
                action = %event.action,
                event_name = %event_name,
                "no broadcaster attached; change dropped"
            );
            return Ok(DispatchOutcome::Skipped { event_name });
        };

        let user = match event.owner() {
            Some(user_id) => {
                let result = broadcaster
                    .broadcast_to_user(user_id, &event_name, &event.data)
                    .await;
                if let Err(err) = &result {
                    tracing::warn!(
                        user_id,
                        event_name = %event_name,
                        error = %err,
                        "user broadcast failed"
                    );
                }
                Some(Delivery::from_result(result))
            }
            None => None,
        };

        let result = broadcaster
            .broadcast_to_table(&event.table, &event_name, &event.data)
            .await;
        if let Err(err) = &result {
            tracing::warn!(
                table = %event.table,
                event_name = %event_name,
                error = %err,
                "table broadcast failed"
            );
        }
        let table = Delivery::from_result(result);

        tracing::debug!(
            event_name = %event_name,
            user_id = %event.user_id,
            user_delivered = user.as_ref().map(Delivery::is_delivered),
            table_delivered = table.is_delivered(),
            "change dispatched"
        );

        Ok(DispatchOutcome::Dispatched {
            event_name,
            user,
            table,
        })
    }

    /// Adds tables to the user's subscriptions.
    pub fn subscribe_user<I, S>(&self, user_id: &str, tables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.subscribe(user_id, tables);
    }

    /// Removes tables from the user's subscriptions.
    pub fn unsubscribe_user<I, S>(&self, user_id: &str, tables: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.unsubscribe(user_id, tables);
    }

    /// Drops all of a user's subscriptions.
    pub fn remove_user(&self, user_id: &str) -> Vec<String> {
        let mut tables: Vec<String> = self
            .registry
            .remove_user(user_id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        tables.sort_unstable();
        tables
    }

    /// Returns the user's subscribed tables, sorted.
    #[must_use]
    pub fn list_subscriptions(&self, user_id: &str) -> Vec<String> {
        self.registry.list_subscriptions(user_id)
    }

    /// Returns `true` if the user is subscribed to `table`.
    #[must_use]
    pub fn is_subscribed(&self, user_id: &str, table: &str) -> bool {
        self.registry.is_subscribed(user_id, table)
    }

    /// Returns the number of users holding at least one subscription.
    #[must_use]
    pub fn subscribed_user_count(&self) -> usize {
        self.registry.user_count()
    }
}
