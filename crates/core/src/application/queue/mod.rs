// Queue Service - ordering engine use cases for one shop's waitlist

pub mod insert;
pub mod move_down;
pub mod remove;
pub mod update_services;

pub use insert::InsertRequest;
pub use remove::RemoveTarget;
pub use update_services::UpdateServicesRequest;

use crate::application::access_gate::AccessGate;
use crate::application::commit::{publish_change, require_non_empty, Committed};
use crate::application::retry::CommitRetryPolicy;
use crate::domain::{PositionSwap, QueueEntry, QueueSnapshot};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, QueueNotifier, ShopStore, TimeProvider, TransactionalShopStore};
use std::sync::Arc;

/// Queue Service
///
/// Every mutation runs gate -> transactional critical section (retried on
/// conflict) -> change notification.
pub struct QueueService {
    store: Arc<dyn TransactionalShopStore>,
    reader: Arc<dyn ShopStore>,
    gate: AccessGate,
    notifier: Arc<dyn QueueNotifier>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    retry: CommitRetryPolicy,
}

impl QueueService {
    pub fn new<S>(
        store: Arc<S>,
        notifier: Arc<dyn QueueNotifier>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        retry: CommitRetryPolicy,
    ) -> Self
    where
        S: ShopStore + TransactionalShopStore + 'static,
    {
        let reader: Arc<dyn ShopStore> = store.clone();
        Self {
            gate: AccessGate::new(reader.clone(), time_provider.clone()),
            store,
            reader,
            notifier,
            id_provider,
            time_provider,
            retry,
        }
    }

    /// Fresh snapshot of the shop's queue, ascending by position
    pub async fn list_sorted(&self, shop_id: &str) -> Result<QueueSnapshot> {
        require_non_empty(shop_id, "shopId")?;
        self.gate.check(shop_id).await?;
        let entries = self.reader.list_queue(shop_id).await?;
        Ok(QueueSnapshot::new(entries))
    }

    /// Append a new entry at the back of the queue
    pub async fn insert(&self, req: InsertRequest) -> Result<QueueEntry> {
        insert::validate_request(&req)?;
        self.gate.check(&req.shop_id).await?;

        let store = self.store.as_ref();
        let ids = self.id_provider.as_ref();
        let time = self.time_provider.as_ref();
        let req = &req;
        let committed = self
            .retry
            .run(&req.shop_id, move || insert::execute(store, ids, time, req))
            .await?;

        self.publish(&req.shop_id, &committed).await;
        Ok(committed.value)
    }

    pub async fn move_down(&self, shop_id: &str, entry_id: &str) -> Result<PositionSwap> {
        require_non_empty(shop_id, "shopId")?;
        require_non_empty(entry_id, "id")?;
        self.gate.check(shop_id).await?;

        let store = self.store.as_ref();
        let committed = self
            .retry
            .run(shop_id, move || move_down::execute(store, shop_id, entry_id))
            .await?;

        self.publish(shop_id, &committed).await;
        Ok(committed.value)
    }

    pub async fn remove_by_id(&self, shop_id: &str, entry_id: &str) -> Result<QueueEntry> {
        require_non_empty(entry_id, "id")?;
        self.remove(shop_id, RemoveTarget::Entry(entry_id.to_string()))
            .await
            .and_then(|removed| removed.ok_or_else(|| empty_removal(entry_id)))
    }

    pub async fn remove_by_customer(&self, shop_id: &str, customer_ref: &str) -> Result<QueueEntry> {
        require_non_empty(customer_ref, "uid")?;
        self.remove(shop_id, RemoveTarget::Customer(customer_ref.to_string()))
            .await
            .and_then(|removed| removed.ok_or_else(|| empty_removal(customer_ref)))
    }

    /// Remove the head of the queue; `None` on an empty queue
    pub async fn remove_head(&self, shop_id: &str) -> Result<Option<QueueEntry>> {
        self.remove(shop_id, RemoveTarget::Head).await
    }

    pub async fn update_services(&self, req: UpdateServicesRequest) -> Result<QueueEntry> {
        update_services::validate_request(&req)?;
        self.gate.check(&req.shop_id).await?;

        let store = self.store.as_ref();
        let req = &req;
        let committed = self
            .retry
            .run(&req.shop_id, move || update_services::execute(store, req))
            .await?;

        self.publish(&req.shop_id, &committed).await;
        Ok(committed.value)
    }

    async fn remove(&self, shop_id: &str, target: RemoveTarget) -> Result<Option<QueueEntry>> {
        require_non_empty(shop_id, "shopId")?;
        self.gate.check(shop_id).await?;

        let store = self.store.as_ref();
        let target = &target;
        let removed = self
            .retry
            .run(shop_id, move || remove::execute(store, shop_id, target))
            .await?;

        match removed {
            Some(committed) => {
                self.publish(shop_id, &committed).await;
                Ok(Some(committed.value))
            }
            None => Ok(None),
        }
    }

    async fn publish<T>(&self, shop_id: &str, committed: &Committed<T>) {
        publish_change(self.notifier.as_ref(), shop_id, committed.version).await;
    }
}

// Targeted removals either remove something or fail; an empty result is a bug
fn empty_removal(target: &str) -> AppError {
    AppError::Internal(format!("removal of {} returned no entry", target))
}
