// Transaction port for atomic per-shop operations

use crate::domain::{
    Barber, Customer, HistoryOwner, HistoryRecord, PendingRating, PositionSwap, QueueEntry,
    RatingRecord, Shop, ShopVersion,
};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens store transactions; dropping an uncommitted one rolls it back
#[async_trait]
pub trait TransactionalShopStore: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn ShopTransaction>>;
}

/// Shop state operations within a transaction.
///
/// Every mutating use case reads through `load_shop`, writes, then calls
/// `advance_version` with the version it read before committing.
#[async_trait]
pub trait ShopTransaction: Transaction {
    /// Load a shop and open its write section
    async fn load_shop(&mut self, shop_id: &str) -> Result<Option<Shop>>;

    /// All entries of the shop's queue, unordered
    async fn load_queue(&mut self, shop_id: &str) -> Result<Vec<QueueEntry>>;

    /// Insert an entry; a taken (shop, position) pair is a Conflict
    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    /// Exchange two position keys atomically
    async fn swap_positions(&mut self, swap: &PositionSwap) -> Result<()>;

    async fn update_entry_services(
        &mut self,
        entry_id: &str,
        services: &[String],
        total_cost: f64,
    ) -> Result<()>;

    async fn delete_entry(&mut self, entry_id: &str) -> Result<()>;

    async fn load_barber(&mut self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>>;

    /// Persist served count, star total and rating count
    async fn save_barber_counters(&mut self, barber: &Barber) -> Result<()>;

    async fn append_rating(&mut self, barber_id: &str, record: &RatingRecord) -> Result<()>;

    async fn append_history(&mut self, owner: &HistoryOwner, record: &HistoryRecord)
        -> Result<()>;

    async fn load_customer(&mut self, customer_ref: &str) -> Result<Option<Customer>>;

    async fn set_pending_rating(
        &mut self,
        customer_ref: &str,
        pending: Option<&PendingRating>,
    ) -> Result<()>;

    /// Move the shop from `expected` to `expected + 1`.
    ///
    /// Returns `AppError::Conflict` when another writer committed first.
    async fn advance_version(&mut self, shop_id: &str, expected: ShopVersion)
        -> Result<ShopVersion>;
}
