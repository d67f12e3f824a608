// Update Services Use Case

use crate::application::commit::{require_non_empty, require_valid_cost, shop_not_found, Committed};
use crate::domain::{normalize_services, QueueEntry, QueueSnapshot};
use crate::error::{AppError, Result};
use crate::port::TransactionalShopStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServicesRequest {
    pub shop_id: String,
    pub customer_ref: String,
    pub services: Vec<String>,
    pub total_cost: f64,
}

pub fn validate_request(req: &UpdateServicesRequest) -> Result<()> {
    require_non_empty(&req.shop_id, "shopId")?;
    require_non_empty(&req.customer_ref, "customerRef")?;
    require_valid_cost(req.total_cost, "totalCost")?;
    Ok(())
}

/// Replace the service list and cost of the customer's entry in place.
/// The position key is untouched.
pub async fn execute(
    store: &dyn TransactionalShopStore,
    req: &UpdateServicesRequest,
) -> Result<Committed<QueueEntry>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(&req.shop_id)
        .await?
        .ok_or_else(|| shop_not_found(&req.shop_id))?;

    let snapshot = QueueSnapshot::new(tx.load_queue(&shop.id).await?);
    let mut entry = snapshot
        .find_by_customer(&req.customer_ref)
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!("No queue entry for customer {}", req.customer_ref))
        })?;

    entry.services = normalize_services(&req.services);
    entry.total_cost = req.total_cost;

    tx.update_entry_services(&entry.id, &entry.services, entry.total_cost)
        .await?;
    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    Ok(Committed::new(entry, version))
}
