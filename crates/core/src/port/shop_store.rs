// Shop Store Port - reads and single-statement writes outside a transaction

use crate::domain::{Barber, Customer, HistoryOwner, HistoryRecord, QueueEntry, RatingRecord, Shop};
use crate::error::Result;
use async_trait::async_trait;

/// Store interface for shop state.
///
/// Multi-step mutations go through `TransactionalShopStore` instead.
#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn create_shop(&self, shop: &Shop) -> Result<()>;

    async fn find_shop(&self, shop_id: &str) -> Result<Option<Shop>>;

    /// Shops whose trial status is not `expired`, oldest first
    async fn list_open_shops(&self) -> Result<Vec<Shop>>;

    /// One-way flip to `expired`.
    ///
    /// Returns true only for the call that changed the stored status.
    async fn mark_trial_expired(&self, shop_id: &str) -> Result<bool>;

    /// All entries of the shop's queue, unordered
    async fn list_queue(&self, shop_id: &str) -> Result<Vec<QueueEntry>>;

    async fn add_barber(&self, barber: &Barber) -> Result<()>;

    async fn list_barbers(&self, shop_id: &str) -> Result<Vec<Barber>>;

    async fn find_barber(&self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>>;

    async fn barber_ratings(&self, barber_id: &str) -> Result<Vec<RatingRecord>>;

    /// History log of one owner, oldest first
    async fn history(&self, owner: &HistoryOwner) -> Result<Vec<HistoryRecord>>;

    async fn create_customer(&self, customer: &Customer) -> Result<()>;

    async fn find_customer(&self, customer_ref: &str) -> Result<Option<Customer>>;

    /// Returns false when no such customer exists
    async fn clear_pending_rating(&self, customer_ref: &str) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{PendingRating, PositionSwap, ShopVersion, TrialStatus};
    use crate::error::AppError;
    use crate::port::transaction::{ShopTransaction, Transaction, TransactionalShopStore};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    #[derive(Debug, Default, Clone)]
    struct MemoryState {
        /// Commit counter per shop
        revisions: HashMap<String, u64>,
        shops: HashMap<String, Shop>,
        entries: Vec<QueueEntry>,
        barbers: Vec<Barber>,
        ratings: Vec<(String, RatingRecord)>,
        history: Vec<(HistoryOwner, HistoryRecord)>,
        customers: HashMap<String, Customer>,
    }

    /// In-memory store with per-shop optimistic transactions.
    ///
    /// A transaction works on a private copy and commits only if no other
    /// commit touched the same shop since it began; otherwise commit fails
    /// with Conflict. Commits on other shops are merged, never rejected.
    #[derive(Default)]
    pub struct InMemoryShopStore {
        state: Arc<Mutex<MemoryState>>,
        forced_conflicts: Arc<AtomicU32>,
    }

    impl InMemoryShopStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `n` version advances fail with Conflict
        pub fn inject_conflicts(&self, n: u32) {
            self.forced_conflicts.store(n, Ordering::SeqCst);
        }

        fn lock(&self) -> MutexGuard<'_, MemoryState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[async_trait]
    impl ShopStore for InMemoryShopStore {
        async fn create_shop(&self, shop: &Shop) -> Result<()> {
            let mut state = self.lock();
            if state.shops.contains_key(&shop.id) {
                return Err(AppError::Conflict(format!("shop {} exists", shop.id)));
            }
            state.shops.insert(shop.id.clone(), shop.clone());
            state.revisions.insert(shop.id.clone(), 0);
            Ok(())
        }

        async fn find_shop(&self, shop_id: &str) -> Result<Option<Shop>> {
            Ok(self.lock().shops.get(shop_id).cloned())
        }

        async fn list_open_shops(&self) -> Result<Vec<Shop>> {
            let mut shops: Vec<Shop> = self
                .lock()
                .shops
                .values()
                .filter(|s| !s.is_expired())
                .cloned()
                .collect();
            shops.sort_by_key(|s| s.created_at);
            Ok(shops)
        }

        async fn mark_trial_expired(&self, shop_id: &str) -> Result<bool> {
            let mut state = self.lock();
            let changed = match state.shops.get_mut(shop_id) {
                Some(shop) if shop.trial_status != TrialStatus::Expired => {
                    shop.trial_status = TrialStatus::Expired;
                    true
                }
                _ => false,
            };
            if changed {
                *state.revisions.entry(shop_id.to_string()).or_default() += 1;
            }
            Ok(changed)
        }

        async fn list_queue(&self, shop_id: &str) -> Result<Vec<QueueEntry>> {
            Ok(self
                .lock()
                .entries
                .iter()
                .filter(|e| e.shop_id == shop_id)
                .cloned()
                .collect())
        }

        async fn add_barber(&self, barber: &Barber) -> Result<()> {
            let mut state = self.lock();
            state.barbers.push(barber.clone());
            Ok(())
        }

        async fn list_barbers(&self, shop_id: &str) -> Result<Vec<Barber>> {
            Ok(self
                .lock()
                .barbers
                .iter()
                .filter(|b| b.shop_id == shop_id)
                .cloned()
                .collect())
        }

        async fn find_barber(&self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>> {
            Ok(find_barber_in(&self.lock(), shop_id, barber_id))
        }

        async fn barber_ratings(&self, barber_id: &str) -> Result<Vec<RatingRecord>> {
            Ok(self
                .lock()
                .ratings
                .iter()
                .filter(|(id, _)| id == barber_id)
                .map(|(_, r)| r.clone())
                .collect())
        }

        async fn history(&self, owner: &HistoryOwner) -> Result<Vec<HistoryRecord>> {
            Ok(self
                .lock()
                .history
                .iter()
                .filter(|(o, _)| o == owner)
                .map(|(_, r)| r.clone())
                .collect())
        }

        async fn create_customer(&self, customer: &Customer) -> Result<()> {
            let mut state = self.lock();
            state.customers.insert(customer.id.clone(), customer.clone());
            Ok(())
        }

        async fn find_customer(&self, customer_ref: &str) -> Result<Option<Customer>> {
            Ok(self.lock().customers.get(customer_ref).cloned())
        }

        async fn clear_pending_rating(&self, customer_ref: &str) -> Result<bool> {
            let mut state = self.lock();
            match state.customers.get_mut(customer_ref) {
                Some(customer) => {
                    customer.pending_rating = None;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[async_trait]
    impl TransactionalShopStore for InMemoryShopStore {
        async fn begin_transaction(&self) -> Result<Box<dyn ShopTransaction>> {
            let working = self.lock().clone();
            Ok(Box::new(MemoryTransaction {
                state: Arc::clone(&self.state),
                forced_conflicts: Arc::clone(&self.forced_conflicts),
                shop_id: None,
                base_ratings: working.ratings.len(),
                base_history: working.history.len(),
                touched_customers: HashSet::new(),
                working,
            }))
        }
    }

    fn find_barber_in(state: &MemoryState, shop_id: &str, barber_id: &str) -> Option<Barber> {
        state
            .barbers
            .iter()
            .find(|b| b.id == barber_id && b.shop_id == shop_id)
            .cloned()
    }

    struct MemoryTransaction {
        state: Arc<Mutex<MemoryState>>,
        forced_conflicts: Arc<AtomicU32>,
        /// Shop bound by the first `load_shop`
        shop_id: Option<String>,
        base_ratings: usize,
        base_history: usize,
        touched_customers: HashSet<String>,
        working: MemoryState,
    }

    impl MemoryTransaction {
        fn entry_mut(&mut self, entry_id: &str) -> Result<&mut QueueEntry> {
            self.working
                .entries
                .iter_mut()
                .find(|e| e.id == entry_id)
                .ok_or_else(|| AppError::NotFound(format!("queue entry {}", entry_id)))
        }
    }

    #[async_trait]
    impl Transaction for MemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            let MemoryTransaction {
                state,
                shop_id,
                base_ratings,
                base_history,
                touched_customers,
                mut working,
                ..
            } = *self;
            let mut live = state.lock().unwrap_or_else(PoisonError::into_inner);

            if let Some(shop_id) = &shop_id {
                let base = working.revisions.get(shop_id).copied().unwrap_or_default();
                let current = live.revisions.get(shop_id).copied().unwrap_or_default();
                if current != base {
                    return Err(AppError::Conflict(format!(
                        "shop {} changed since transaction began",
                        shop_id
                    )));
                }

                if let Some(shop) = working.shops.remove(shop_id) {
                    live.shops.insert(shop_id.clone(), shop);
                }
                live.entries.retain(|e| &e.shop_id != shop_id);
                live.entries
                    .extend(working.entries.drain(..).filter(|e| &e.shop_id == shop_id));
                for barber in working.barbers.iter().filter(|b| &b.shop_id == shop_id) {
                    if let Some(stored) = live.barbers.iter_mut().find(|b| b.id == barber.id) {
                        *stored = barber.clone();
                    }
                }
                live.revisions.insert(shop_id.clone(), base + 1);
            }

            live.ratings.extend(working.ratings.drain(base_ratings..));
            live.history.extend(working.history.drain(base_history..));
            for customer_ref in touched_customers {
                if let Some(customer) = working.customers.remove(&customer_ref) {
                    live.customers.insert(customer_ref, customer);
                }
            }
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ShopTransaction for MemoryTransaction {
        async fn load_shop(&mut self, shop_id: &str) -> Result<Option<Shop>> {
            if self.shop_id.is_none() {
                self.shop_id = Some(shop_id.to_string());
            }
            if self.shop_id.as_deref() != Some(shop_id) {
                return Err(AppError::Internal(format!(
                    "transaction bound to another shop, cannot load shop {}",
                    shop_id
                )));
            }
            Ok(self.working.shops.get(shop_id).cloned())
        }

        async fn load_queue(&mut self, shop_id: &str) -> Result<Vec<QueueEntry>> {
            Ok(self
                .working
                .entries
                .iter()
                .filter(|e| e.shop_id == shop_id)
                .cloned()
                .collect())
        }

        async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()> {
            let taken = self
                .working
                .entries
                .iter()
                .any(|e| e.shop_id == entry.shop_id && e.position == entry.position);
            if taken {
                return Err(AppError::Conflict(format!(
                    "position {} taken in shop {}",
                    entry.position, entry.shop_id
                )));
            }
            self.working.entries.push(entry.clone());
            Ok(())
        }

        async fn swap_positions(&mut self, swap: &PositionSwap) -> Result<()> {
            self.entry_mut(&swap.moved_id)?.position = swap.moved_to;
            self.entry_mut(&swap.displaced_id)?.position = swap.displaced_to;
            Ok(())
        }

        async fn update_entry_services(
            &mut self,
            entry_id: &str,
            services: &[String],
            total_cost: f64,
        ) -> Result<()> {
            let entry = self.entry_mut(entry_id)?;
            entry.services = services.to_vec();
            entry.total_cost = total_cost;
            Ok(())
        }

        async fn delete_entry(&mut self, entry_id: &str) -> Result<()> {
            let before = self.working.entries.len();
            self.working.entries.retain(|e| e.id != entry_id);
            if self.working.entries.len() == before {
                return Err(AppError::NotFound(format!("queue entry {}", entry_id)));
            }
            Ok(())
        }

        async fn load_barber(&mut self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>> {
            Ok(find_barber_in(&self.working, shop_id, barber_id))
        }

        async fn save_barber_counters(&mut self, barber: &Barber) -> Result<()> {
            let stored = self
                .working
                .barbers
                .iter_mut()
                .find(|b| b.id == barber.id)
                .ok_or_else(|| AppError::NotFound(format!("barber {}", barber.id)))?;
            stored.customers_served = barber.customers_served;
            stored.total_stars = barber.total_stars;
            stored.rating_count = barber.rating_count;
            Ok(())
        }

        async fn append_rating(&mut self, barber_id: &str, record: &RatingRecord) -> Result<()> {
            self.working
                .ratings
                .push((barber_id.to_string(), record.clone()));
            Ok(())
        }

        async fn append_history(
            &mut self,
            owner: &HistoryOwner,
            record: &HistoryRecord,
        ) -> Result<()> {
            self.working.history.push((owner.clone(), record.clone()));
            Ok(())
        }

        async fn load_customer(&mut self, customer_ref: &str) -> Result<Option<Customer>> {
            Ok(self.working.customers.get(customer_ref).cloned())
        }

        async fn set_pending_rating(
            &mut self,
            customer_ref: &str,
            pending: Option<&PendingRating>,
        ) -> Result<()> {
            let customer = self
                .working
                .customers
                .get_mut(customer_ref)
                .ok_or_else(|| AppError::NotFound(format!("customer {}", customer_ref)))?;
            customer.pending_rating = pending.cloned();
            self.touched_customers.insert(customer_ref.to_string());
            Ok(())
        }

        async fn advance_version(
            &mut self,
            shop_id: &str,
            expected: ShopVersion,
        ) -> Result<ShopVersion> {
            let forced = self
                .forced_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if forced {
                return Err(AppError::Conflict(format!("injected conflict on {}", shop_id)));
            }

            let shop = self
                .working
                .shops
                .get_mut(shop_id)
                .ok_or_else(|| AppError::NotFound(format!("shop {}", shop_id)))?;
            if shop.version != expected {
                return Err(AppError::Conflict(format!(
                    "shop {} at version {}, expected {}",
                    shop_id, shop.version, expected
                )));
            }
            shop.version = expected + 1;
            Ok(shop.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryShopStore;
    use super::*;
    use crate::port::TransactionalShopStore;

    fn entry(id: &str, shop_id: &str, position: i64) -> QueueEntry {
        QueueEntry {
            id: id.to_string(),
            shop_id: shop_id.to_string(),
            customer_ref: None,
            name: id.to_uppercase(),
            position,
            code: None,
            services: vec![],
            total_cost: 0.0,
            created_at: 0,
        }
    }

    async fn store_with_shops() -> InMemoryShopStore {
        let store = InMemoryShopStore::new();
        for id in ["a", "b"] {
            store
                .create_shop(&Shop::new_trial(id.into(), id.into(), 0, 30))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_commit_on_other_shop_does_not_conflict() {
        let store = store_with_shops().await;

        let mut on_a = store.begin_transaction().await.unwrap();
        let shop_a = on_a.load_shop("a").await.unwrap().unwrap();
        on_a.insert_entry(&entry("a1", "a", 1)).await.unwrap();

        let mut on_b = store.begin_transaction().await.unwrap();
        let shop_b = on_b.load_shop("b").await.unwrap().unwrap();
        on_b.insert_entry(&entry("b1", "b", 1)).await.unwrap();
        on_b.advance_version("b", shop_b.version).await.unwrap();
        on_b.commit().await.unwrap();

        on_a.advance_version("a", shop_a.version).await.unwrap();
        on_a.commit().await.unwrap();

        assert_eq!(store.list_queue("a").await.unwrap().len(), 1);
        assert_eq!(store.list_queue("b").await.unwrap().len(), 1);
        assert_eq!(store.find_shop("a").await.unwrap().unwrap().version, 1);
        assert_eq!(store.find_shop("b").await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_commit_on_same_shop_conflicts() {
        let store = store_with_shops().await;

        let mut first = store.begin_transaction().await.unwrap();
        let mut second = store.begin_transaction().await.unwrap();
        first.load_shop("a").await.unwrap();
        second.load_shop("a").await.unwrap();

        first.insert_entry(&entry("a1", "a", 1)).await.unwrap();
        first.commit().await.unwrap();

        second.insert_entry(&entry("a2", "a", 1)).await.unwrap();
        assert!(second.commit().await.unwrap_err().is_conflict());
        assert_eq!(store.list_queue("a").await.unwrap().len(), 1);
    }
}
