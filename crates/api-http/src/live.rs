//! LiveQueueHub - per-shop fan-out of queue change signals
//!
//! ```text
//! QueueService / CompletionService (after commit)
//!       │ QueueChanged
//!       ▼
//! LiveQueueHub
//!   └── rooms: shop_id → broadcast::Sender<QueueChanged>
//!         │
//!         ▼
//!   WebSocket sessions (one receiver per joined shop)
//! ```
//!
//! A room exists only while it has subscribers. Rooms left empty are pruned
//! on release and on the next publish that finds nobody listening.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use walkin_core::port::{NotifyError, QueueChanged, QueueNotifier};

/// Per-room buffer; slower receivers see `Lagged` and resync
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct LiveQueueHub {
    rooms: Arc<DashMap<String, broadcast::Sender<QueueChanged>>>,
}

impl LiveQueueHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a shop's room, creating it on first subscriber
    pub fn subscribe(&self, shop_id: &str) -> broadcast::Receiver<QueueChanged> {
        self.rooms
            .entry(shop_id.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Deliver to everyone in the shop's room; returns how many received it
    pub fn publish(&self, event: QueueChanged) -> usize {
        let shop_id = event.shop_id.clone();
        let delivered = match self.rooms.get(&shop_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => return 0,
        };
        if delivered == 0 {
            self.release(&shop_id);
        }
        delivered
    }

    /// Drop the shop's room if nobody is subscribed any more
    pub fn release(&self, shop_id: &str) {
        if self
            .rooms
            .remove_if(shop_id, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            debug!(shop_id = %shop_id, "Live room closed");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn subscriber_count(&self, shop_id: &str) -> usize {
        self.rooms
            .get(shop_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl QueueNotifier for LiveQueueHub {
    async fn notify_shop_queue_changed(&self, event: QueueChanged) -> Result<(), NotifyError> {
        let shop_id = event.shop_id.clone();
        let delivered = self.publish(event);
        debug!(shop_id = %shop_id, delivered, "Queue change fanned out");
        Ok(())
    }
}
