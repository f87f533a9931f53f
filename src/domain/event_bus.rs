//! In-process fan-out between the WebSocket broadcaster and open sockets.
//!
//! The broadcaster turns each `broadcast_to_user` / `broadcast_to_table` call
//! into one [`OutboundEvent`] on the bus. Every socket task holds its own
//! receiver and decides locally whether the event's [`DeliveryTarget`]
//! addresses it, so the bus itself never inspects targets.
//!
//! [`DeliveryTarget`]: super::DeliveryTarget

use std::sync::Arc;

use tokio::sync::broadcast;

use super::OutboundEvent;

/// Shared handle to the delivery channel.
///
/// Cloning the handle is cheap and every clone feeds the same channel. The
/// channel keeps at most `capacity` undelivered events; a socket that falls
/// further behind skips the oldest ones and observes
/// [`broadcast::error::RecvError::Lagged`] on its next receive.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<OutboundEvent>>,
}

impl EventBus {
    /// Opens a channel holding up to `capacity` pending deliveries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Hands a delivery to every open socket.
    ///
    /// The result is the number of sockets that will see it. Zero is normal
    /// when nobody is connected; the delivery is then discarded.
    pub fn publish(&self, event: OutboundEvent) -> usize {
        self.sender.send(Arc::new(event)).unwrap_or(0)
    }

    /// Attaches a socket to the bus.
    ///
    /// The receiver sees deliveries published after this call only.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<OutboundEvent>> {
        self.sender.subscribe()
    }

    /// Number of sockets currently attached.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
