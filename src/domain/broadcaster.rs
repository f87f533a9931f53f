//! Transport-facing delivery capability.
//!
//! The mediator only knows this two-method interface. A WebSocket hub, a
//! message queue producer, or an HTTP long-poll registry can all sit behind
//! it; each implementation owns its own timeout and retry policy.

use std::fmt;

use async_trait::async_trait;

use crate::error::RelayError;

/// Pushes named events to connected clients.
///
/// Both methods are best-effort: `Ok` means the message was handed to the
/// transport, not that any client received it. Addressing a user or table
/// with no live connections is not an error.
#[async_trait]
pub trait Broadcaster: Send + Sync + fmt::Debug {
    /// Delivers `payload` to every live connection of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Delivery`] if the transport rejected the message.
    async fn broadcast_to_user(
        &self,
        user_id: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RelayError>;

    /// Delivers `payload` to every connection subscribed to `table`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Delivery`] if the transport rejected the message.
    async fn broadcast_to_table(
        &self,
        table: &str,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RelayError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording broadcaster for unit tests.

    use tokio::sync::Mutex;

    use super::*;

    /// One observed broadcaster call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        User(String, String, serde_json::Value),
        Table(String, String, serde_json::Value),
    }

    /// Records every call in order; can be told to fail either method.
    ///
    /// The user call yields once before returning, so tests that race other
    /// tasks against a dispatch see it suspended mid-event.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingBroadcaster {
        calls: Mutex<Vec<Call>>,
        fail_user: bool,
        fail_table: bool,
    }

    impl RecordingBroadcaster {
        pub(crate) fn failing(fail_user: bool, fail_table: bool) -> Self {
            Self {
                calls: Mutex::default(),
                fail_user,
                fail_table,
            }
        }

        pub(crate) async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl Broadcaster for RecordingBroadcaster {
        async fn broadcast_to_user(
            &self,
            user_id: &str,
            event_name: &str,
            payload: &serde_json::Value,
        ) -> Result<(), RelayError> {
            self.calls.lock().await.push(Call::User(
                user_id.to_string(),
                event_name.to_string(),
                payload.clone(),
            ));
            // lets a concurrent `set_broadcaster` land between the two calls
            tokio::task::yield_now().await;
            if self.fail_user {
                return Err(RelayError::Delivery(format!("user {user_id} unreachable")));
            }
            Ok(())
        }

        async fn broadcast_to_table(
            &self,
            table: &str,
            event_name: &str,
            payload: &serde_json::Value,
        ) -> Result<(), RelayError> {
            self.calls.lock().await.push(Call::Table(
                table.to_string(),
                event_name.to_string(),
                payload.clone(),
            ));
            if self.fail_table {
                return Err(RelayError::Delivery(format!("table {table} unreachable")));
            }
            Ok(())
        }
    }
}
