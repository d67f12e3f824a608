// Per-shop write sections

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per shop id.
///
/// Transactions on the same shop queue behind each other here instead of
/// on SQLite's database-wide write lock, so shops never wait on one another.
#[derive(Debug, Default)]
pub struct ShopLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ShopLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the shop's section; it stays held until the guard drops
    pub async fn acquire(&self, shop_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(shop_id.to_string())
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Number of shops seen so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_shop_waits_for_holder() {
        let locks = ShopLocks::new();
        let held = locks.acquire("s1").await;

        let blocked = timeout(Duration::from_millis(50), locks.acquire("s1")).await;
        assert!(blocked.is_err());

        drop(held);
        assert!(timeout(Duration::from_millis(50), locks.acquire("s1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_other_shop_does_not_wait() {
        let locks = ShopLocks::new();
        let _held = locks.acquire("s1").await;

        assert!(timeout(Duration::from_millis(50), locks.acquire("s2"))
            .await
            .is_ok());
        assert_eq!(locks.len(), 2);
    }
}
