// Change Notifier Port - fan-out of "queue changed" signals

use crate::domain::{ShopId, ShopVersion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signal that a shop's queue changed; subscribers re-fetch the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueChanged {
    pub shop_id: ShopId,
    pub message: String,
    /// Committed shop version, lets subscribers drop stale signals
    pub version: ShopVersion,
}

impl QueueChanged {
    pub fn new(shop_id: impl Into<ShopId>, version: ShopVersion) -> Self {
        let shop_id = shop_id.into();
        Self {
            message: format!("Queue updated for shop {}", shop_id),
            shop_id,
            version,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(String),
}

/// Called after every committed queue mutation.
///
/// Delivery is at-most-once; callers log failures and never retry.
#[async_trait]
pub trait QueueNotifier: Send + Sync {
    async fn notify_shop_queue_changed(&self, event: QueueChanged) -> Result<(), NotifyError>;
}

pub mod mocks {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Records every event it is handed
    #[derive(Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<QueueChanged>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<QueueChanged> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn events_for(&self, shop_id: &str) -> Vec<QueueChanged> {
            self.events()
                .into_iter()
                .filter(|e| e.shop_id == shop_id)
                .collect()
        }
    }

    #[async_trait]
    impl QueueNotifier for RecordingNotifier {
        async fn notify_shop_queue_changed(&self, event: QueueChanged) -> Result<(), NotifyError> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
            Ok(())
        }
    }

    /// Always fails, for exercising failure isolation
    pub struct FailingNotifier;

    #[async_trait]
    impl QueueNotifier for FailingNotifier {
        async fn notify_shop_queue_changed(&self, event: QueueChanged) -> Result<(), NotifyError> {
            Err(NotifyError::Transport(format!(
                "subscriber gone for shop {}",
                event.shop_id
            )))
        }
    }
}
