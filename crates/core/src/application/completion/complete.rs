// Complete Service Use Case - queue entry -> history records

use crate::application::commit::{require_non_empty, require_valid_cost, shop_not_found, Committed};
use crate::domain::{
    is_guest_ref, normalize_services, HistoryOwner, HistoryRecord, PendingRating, QueueEntry,
    QueueSnapshot,
};
use crate::error::{AppError, Result};
use crate::port::{TimeProvider, TransactionalShopStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteServiceRequest {
    pub shop_id: String,
    pub customer_ref: String,
    pub barber_id: String,
    pub services: Vec<String>,
    pub cost: f64,
}

/// What a completion changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub record: HistoryRecord,
    /// None when the customer was no longer queued
    pub removed_entry: Option<QueueEntry>,
    /// False for guests and customers without a stored record
    pub customer_updated: bool,
}

pub fn validate_request(req: &CompleteServiceRequest) -> Result<()> {
    require_non_empty(&req.shop_id, "shopId")?;
    require_non_empty(&req.customer_ref, "customerRef")?;
    require_non_empty(&req.barber_id, "barberId")?;
    require_valid_cost(req.cost, "cost")?;
    if normalize_services(&req.services).is_empty() {
        return Err(AppError::Validation("service is required".to_string()));
    }
    Ok(())
}

/// Execute the completion as one transaction:
/// barber history + counter, shop history, queue removal and, for stored
/// non-guest customers, customer history + pending rating.
pub async fn execute(
    store: &dyn TransactionalShopStore,
    time_provider: &dyn TimeProvider,
    req: &CompleteServiceRequest,
) -> Result<Committed<CompletionSummary>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(&req.shop_id)
        .await?
        .ok_or_else(|| shop_not_found(&req.shop_id))?;

    let mut barber = tx
        .load_barber(&shop.id, &req.barber_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Barber not found: {}", req.barber_id)))?;

    let record = HistoryRecord::new(
        normalize_services(&req.services),
        req.cost,
        time_provider.now_millis(),
    );

    barber.record_service();
    tx.save_barber_counters(&barber).await?;
    tx.append_history(&HistoryOwner::Barber(barber.id.clone()), &record)
        .await?;
    tx.append_history(&HistoryOwner::Shop(shop.id.clone()), &record)
        .await?;

    // Entry already gone (served twice, removed by staff) is fine
    let snapshot = QueueSnapshot::new(tx.load_queue(&shop.id).await?);
    let removed_entry = snapshot.find_by_customer(&req.customer_ref).cloned();
    if let Some(entry) = &removed_entry {
        tx.delete_entry(&entry.id).await?;
    }

    let mut customer_updated = false;
    if !is_guest_ref(&req.customer_ref) {
        if let Some(customer) = tx.load_customer(&req.customer_ref).await? {
            tx.append_history(&HistoryOwner::Customer(customer.id.clone()), &record)
                .await?;
            let pending = PendingRating {
                barber_id: barber.id.clone(),
                shop_id: shop.id.clone(),
            };
            tx.set_pending_rating(&customer.id, Some(&pending)).await?;
            customer_updated = true;
        }
    }

    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    debug!(
        shop_id = %shop.id,
        barber_id = %barber.id,
        customer_ref = %req.customer_ref,
        removed = removed_entry.is_some(),
        customer_updated,
        "Service completed"
    );

    Ok(Committed::new(
        CompletionSummary {
            record,
            removed_entry,
            customer_updated,
        },
        version,
    ))
}
