// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod notifier;
pub mod shop_store;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use notifier::{NotifyError, QueueChanged, QueueNotifier};
pub use shop_store::ShopStore;
pub use time_provider::TimeProvider;
pub use transaction::{ShopTransaction, Transaction, TransactionalShopStore};
