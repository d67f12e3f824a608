// Move Down Use Case - the only reordering primitive

use crate::application::commit::{shop_not_found, Committed};
use crate::domain::{PositionSwap, QueueSnapshot};
use crate::error::Result;
use crate::port::TransactionalShopStore;
use tracing::debug;

/// Swap `entry_id`'s position key with the entry right behind it.
///
/// Fails with `DomainError::AlreadyAtEnd` for the last entry; the queue is
/// left unchanged.
pub async fn execute(
    store: &dyn TransactionalShopStore,
    shop_id: &str,
    entry_id: &str,
) -> Result<Committed<PositionSwap>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(shop_id)
        .await?
        .ok_or_else(|| shop_not_found(shop_id))?;

    let snapshot = QueueSnapshot::new(tx.load_queue(&shop.id).await?);
    let swap = snapshot.plan_move_down(entry_id)?;

    tx.swap_positions(&swap).await?;
    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    debug!(
        shop_id = %shop_id,
        entry_id = %swap.moved_id,
        from = swap.displaced_to,
        to = swap.moved_to,
        "Queue entry moved down"
    );

    Ok(Committed::new(swap, version))
}
