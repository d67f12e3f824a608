// Service Completion - turns served queue entries into history and ratings

pub mod complete;
pub mod rating;

pub use complete::{CompleteServiceRequest, CompletionSummary};
pub use rating::{RatingOutcome, SubmitRatingRequest};

use crate::application::access_gate::AccessGate;
use crate::application::commit::{publish_change, require_non_empty};
use crate::application::retry::CommitRetryPolicy;
use crate::error::{AppError, Result};
use crate::port::{QueueNotifier, ShopStore, TimeProvider, TransactionalShopStore};
use std::sync::Arc;
use tracing::info;

pub struct CompletionService {
    store: Arc<dyn TransactionalShopStore>,
    reader: Arc<dyn ShopStore>,
    gate: AccessGate,
    notifier: Arc<dyn QueueNotifier>,
    time_provider: Arc<dyn TimeProvider>,
    retry: CommitRetryPolicy,
}

impl CompletionService {
    pub fn new<S>(
        store: Arc<S>,
        notifier: Arc<dyn QueueNotifier>,
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
            time_provider,
            retry,
        }
    }

    /// Record a finished service and drop the customer from the queue
    pub async fn complete_service(&self, req: CompleteServiceRequest) -> Result<CompletionSummary> {
        complete::validate_request(&req)?;
        self.gate.check(&req.shop_id).await?;

        let store = self.store.as_ref();
        let time = self.time_provider.as_ref();
        let req = &req;
        let committed = self
            .retry
            .run(&req.shop_id, move || complete::execute(store, time, req))
            .await?;

        info!(
            shop_id = %req.shop_id,
            barber_id = %req.barber_id,
            version = committed.version,
            "Service recorded"
        );
        publish_change(self.notifier.as_ref(), &req.shop_id, committed.version).await;
        Ok(committed.value)
    }

    /// Rate the barber from the customer's last completed service.
    ///
    /// Not gated by the trial and publishes nothing: the queue is unchanged.
    pub async fn submit_rating(&self, req: SubmitRatingRequest) -> Result<RatingOutcome> {
        let stars = rating::validate_request(&req)?;

        let store = self.store.as_ref();
        let time = self.time_provider.as_ref();
        let req = &req;
        let committed = self
            .retry
            .run(&req.shop_id, move || rating::execute(store, time, req, stars))
            .await?;

        Ok(committed.value)
    }

    /// Drop a pending rating without rating. Idempotent.
    pub async fn reset_pending_rating(&self, customer_ref: &str) -> Result<()> {
        require_non_empty(customer_ref, "customerRef")?;
        if !self.reader.clear_pending_rating(customer_ref).await? {
            return Err(AppError::NotFound(format!(
                "Customer not found: {}",
                customer_ref
            )));
        }
        Ok(())
    }
}
