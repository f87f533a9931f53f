//! WebSocket implementation of the [`Broadcaster`] capability.
//!
//! Each call becomes one [`OutboundEvent`] on the [`EventBus`]; every
//! connection task receives it and forwards it only if the target matches
//! its user or one of its tables.

use async_trait::async_trait;

use crate::domain::{Broadcaster, EventBus, OutboundEvent};
use crate::error::RelayError;

/// Fans deliveries out to WebSocket connections through the [`EventBus`].
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    bus: EventBus,
}

impl WsBroadcaster {
    /// Creates a broadcaster publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Broadcaster for WsBroadcaster {
    async fn broadcast_to_user(
        &self,
        user_id: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RelayError> {
        let receivers = self
            .bus
            .publish(OutboundEvent::to_user(user_id, event_name, payload));
        tracing::trace!(user_id, event_name, receivers, "user delivery published");
        Ok(())
    }

    async fn broadcast_to_table(
        &self,
        table: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RelayError> {
        let receivers = self
            .bus
            .publish(OutboundEvent::to_table(table, event_name, payload));
        tracing::trace!(table, event_name, receivers, "table delivery published");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::DeliveryTarget;

    #[tokio::test]
    async fn user_and_table_calls_publish_targets() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let broadcaster = WsBroadcaster::new(bus);
        let data = serde_json::json!({"id": 1});

        tokio_test::assert_ok!(broadcaster.broadcast_to_user("u1", "goals:update", &data).await);
        tokio_test::assert_ok!(
            broadcaster
                .broadcast_to_table("goals", "goals:update", &data)
                .await
        );

        let Ok(first) = rx.recv().await else {
            panic!("missing user delivery");
        };
        assert_eq!(first.target, DeliveryTarget::User("u1".to_string()));
        let Ok(second) = rx.recv().await else {
            panic!("missing table delivery");
        };
        assert_eq!(second.target, DeliveryTarget::Table("goals".to_string()));
        assert_eq!(second.payload, data);
    }

    #[tokio::test]
    async fn no_connections_is_not_an_error() {
        let broadcaster = WsBroadcaster::new(EventBus::new(4));
        let result = broadcaster
            .broadcast_to_table("goals", "goals:insert", &serde_json::Value::Null)
            .await;
        assert!(result.is_ok());
    }
}
