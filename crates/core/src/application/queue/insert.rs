// Insert Use Case

use crate::application::commit::{require_non_empty, require_valid_cost, shop_not_found, Committed};
use crate::domain::{next_position, normalize_services, QueueEntry};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider, TransactionalShopStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Insert request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRequest {
    pub shop_id: String,
    pub name: String,
    pub customer_ref: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    pub code: Option<String>,
    #[serde(default)]
    pub total_cost: f64,
}

/// Reject malformed requests before the store is touched
pub fn validate_request(req: &InsertRequest) -> Result<()> {
    require_non_empty(&req.shop_id, "shopId")?;
    require_non_empty(&req.name, "name")?;
    require_valid_cost(req.total_cost, "totalCost")?;
    Ok(())
}

/// Execute insert use case (allocate + insert in one transaction)
///
/// # Arguments
///
/// * `store` - Transactional shop store
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Insert request
pub async fn execute(
    store: &dyn TransactionalShopStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: &InsertRequest,
) -> Result<Committed<QueueEntry>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(&req.shop_id)
        .await?
        .ok_or_else(|| shop_not_found(&req.shop_id))?;

    // Allocation reads the same snapshot the insert commits against
    let queue = tx.load_queue(&shop.id).await?;
    let position = next_position(&queue);

    let entry = QueueEntry {
        id: id_provider.generate_id(),
        shop_id: shop.id.clone(),
        customer_ref: req.customer_ref.clone().filter(|r| !r.is_empty()),
        name: req.name.trim().to_string(),
        position,
        code: req.code.clone().filter(|c| !c.is_empty()),
        services: normalize_services(&req.services),
        total_cost: req.total_cost,
        created_at: time_provider.now_millis(),
    };

    tx.insert_entry(&entry).await?;
    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    debug!(
        shop_id = %entry.shop_id,
        entry_id = %entry.id,
        position,
        "Queue entry inserted"
    );

    Ok(Committed::new(entry, version))
}
