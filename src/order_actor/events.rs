//! Status-changed notifications.
//!
//! The order actor publishes a [`StatusChanged`] for every transition it applies.
//! Consumers (tracking views, admin sessions, the demo binary) subscribe and
//! decide for themselves how to react.

use crate::model::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

/// Broadcast bus for [`StatusChanged`] events.
#[derive(Debug, Clone)]
pub struct StatusEvents {
    sender: broadcast::Sender<StatusChanged>,
}

impl StatusEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire-and-forget. Having no subscriber is not an error.
    pub fn publish(&self, event: StatusChanged) {
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(receivers, "Status event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChanged> {
        self.sender.subscribe()
    }
}

impl Default for StatusEvents {
    fn default() -> Self {
        Self::new(256)
    }
}
