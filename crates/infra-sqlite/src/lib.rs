// Walk-in Queue Infrastructure - SQLite Adapter
// Implements: ShopStore, TransactionalShopStore

mod connection;
mod error;
mod migration;
mod rows;
mod shop_locks;
mod shop_store;
mod transaction;

pub use connection::create_pool;
pub use error::map_sqlx_error;
pub use migration::run_migrations;
pub use shop_locks::ShopLocks;
pub use shop_store::SqliteShopStore;
pub use transaction::SqliteShopTransaction;

// Note: sqlx::Error conversion goes through map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
