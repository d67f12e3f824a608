// Remove Use Case (by id, by customer, or head-of-line)

use crate::application::commit::{shop_not_found, Committed};
use crate::domain::{DomainError, QueueEntry, QueueSnapshot};
use crate::error::{AppError, Result};
use crate::port::TransactionalShopStore;
use tracing::debug;

/// Which entry to remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    Entry(String),
    /// First entry in position order owned by this customer
    Customer(String),
    /// Smallest position key
    Head,
}

/// Remove one entry.
///
/// Returns `Ok(None)` only for `Head` on an empty queue; nothing is written
/// in that case.
pub async fn execute(
    store: &dyn TransactionalShopStore,
    shop_id: &str,
    target: &RemoveTarget,
) -> Result<Option<Committed<QueueEntry>>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(shop_id)
        .await?
        .ok_or_else(|| shop_not_found(shop_id))?;

    let snapshot = QueueSnapshot::new(tx.load_queue(&shop.id).await?);
    let victim = match target {
        RemoveTarget::Entry(entry_id) => snapshot
            .find(entry_id)
            .ok_or_else(|| DomainError::EntryNotFound(entry_id.clone()))?,
        RemoveTarget::Customer(customer_ref) => {
            snapshot.find_by_customer(customer_ref).ok_or_else(|| {
                AppError::NotFound(format!("No queue entry for customer {}", customer_ref))
            })?
        }
        RemoveTarget::Head => match snapshot.head() {
            Some(head) => head,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        },
    }
    .clone();

    tx.delete_entry(&victim.id).await?;
    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    debug!(
        shop_id = %shop_id,
        entry_id = %victim.id,
        position = victim.position,
        "Queue entry removed"
    );

    Ok(Some(Committed::new(victim, version)))
}
