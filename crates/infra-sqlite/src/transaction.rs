// SQLite Transaction Implementation

use crate::map_sqlx_error;
use crate::rows::{BarberRow, CustomerRow, EntryRow, ShopRow};
use crate::shop_locks::ShopLocks;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction as SqlxTransaction};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use walkin_core::domain::{
    Barber, Customer, HistoryOwner, HistoryRecord, PendingRating, PositionSwap, QueueEntry,
    RatingRecord, Shop, ShopVersion,
};
use walkin_core::error::{AppError, Result};
use walkin_core::port::{ShopTransaction, Transaction};

/// Write section over one shop.
///
/// `load_shop` enters the shop's section in `ShopLocks`. Reads before the
/// first write go straight to the pool; the SQLite transaction (and with it
/// the database write lock) opens lazily at the first write and lasts only
/// until commit. `advance_version` stays the optimistic guard against
/// writers outside this process.
pub struct SqliteShopTransaction {
    pool: SqlitePool,
    locks: Arc<ShopLocks>,
    section: Option<(String, OwnedMutexGuard<()>)>,
    tx: Option<SqlxTransaction<'static, Sqlite>>,
}

impl SqliteShopTransaction {
    pub fn new(pool: SqlitePool, locks: Arc<ShopLocks>) -> Self {
        Self {
            pool,
            locks,
            section: None,
            tx: None,
        }
    }

    /// The open SQLite transaction, begun on first use
    async fn writer(&mut self) -> Result<&mut SqlxTransaction<'static, Sqlite>> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await.map_err(map_sqlx_error)?,
        };
        Ok(self.tx.insert(tx))
    }

    async fn enter_section(&mut self, shop_id: &str) -> Result<()> {
        if let Some((held, _)) = &self.section {
            if held == shop_id {
                return Ok(());
            }
            return Err(AppError::Internal(format!(
                "transaction bound to shop {}, cannot load shop {}",
                held, shop_id
            )));
        }

        let guard = self.locks.acquire(shop_id).await;
        self.section = Some((shop_id.to_string(), guard));
        Ok(())
    }

    async fn set_position(&mut self, entry_id: &str, position: i64) -> Result<()> {
        let result = sqlx::query("UPDATE queue_entries SET position = ? WHERE id = ?")
            .bind(position)
            .bind(entry_id)
            .execute(&mut **self.writer().await?)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("queue entry {}", entry_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for SqliteShopTransaction {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(map_sqlx_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ShopTransaction for SqliteShopTransaction {
    async fn load_shop(&mut self, shop_id: &str) -> Result<Option<Shop>> {
        self.enter_section(shop_id).await?;

        let query = sqlx::query_as::<_, ShopRow>("SELECT * FROM shops WHERE id = ?").bind(shop_id);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(map_sqlx_error)?;

        row.map(ShopRow::into_shop).transpose()
    }

    async fn load_queue(&mut self, shop_id: &str) -> Result<Vec<QueueEntry>> {
        let query = sqlx::query_as::<_, EntryRow>(
            "SELECT * FROM queue_entries WHERE shop_id = ? ORDER BY position ASC",
        )
        .bind(shop_id);
        let rows = match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await,
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, shop_id, customer_ref, name, position,
                code, services, total_cost, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.shop_id)
        .bind(&entry.customer_ref)
        .bind(&entry.name)
        .bind(entry.position)
        .bind(&entry.code)
        .bind(serde_json::to_string(&entry.services)?)
        .bind(entry.total_cost)
        .bind(entry.created_at)
        .execute(&mut **self.writer().await?)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn swap_positions(&mut self, swap: &PositionSwap) -> Result<()> {
        // The unique (shop_id, position) index is checked per row, so park the
        // moved entry on a negative key first. Live keys are always >= 1.
        self.set_position(&swap.moved_id, -swap.displaced_to).await?;
        self.set_position(&swap.displaced_id, swap.displaced_to).await?;
        self.set_position(&swap.moved_id, swap.moved_to).await?;
        Ok(())
    }

    async fn update_entry_services(
        &mut self,
        entry_id: &str,
        services: &[String],
        total_cost: f64,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE queue_entries SET services = ?, total_cost = ? WHERE id = ?")
                .bind(serde_json::to_string(services)?)
                .bind(total_cost)
                .bind(entry_id)
                .execute(&mut **self.writer().await?)
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("queue entry {}", entry_id)));
        }
        Ok(())
    }

    async fn delete_entry(&mut self, entry_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE id = ?")
            .bind(entry_id)
            .execute(&mut **self.writer().await?)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("queue entry {}", entry_id)));
        }
        Ok(())
    }

    async fn load_barber(&mut self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>> {
        let query =
            sqlx::query_as::<_, BarberRow>("SELECT * FROM barbers WHERE id = ? AND shop_id = ?")
                .bind(barber_id)
                .bind(shop_id);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(map_sqlx_error)?;

        Ok(row.map(BarberRow::into_barber))
    }

    async fn save_barber_counters(&mut self, barber: &Barber) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE barbers
            SET customers_served = ?, total_stars = ?, rating_count = ?
            WHERE id = ?
            "#,
        )
        .bind(barber.customers_served)
        .bind(barber.total_stars)
        .bind(barber.rating_count)
        .bind(&barber.id)
        .execute(&mut **self.writer().await?)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("barber {}", barber.id)));
        }
        Ok(())
    }

    async fn append_rating(&mut self, barber_id: &str, record: &RatingRecord) -> Result<()> {
        sqlx::query("INSERT INTO barber_ratings (barber_id, rating, rated_at) VALUES (?, ?, ?)")
            .bind(barber_id)
            .bind(record.rating)
            .bind(record.rated_at)
            .execute(&mut **self.writer().await?)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn append_history(
        &mut self,
        owner: &HistoryOwner,
        record: &HistoryRecord,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO history_records (owner_kind, owner_id, services, cost, served_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner.kind())
        .bind(owner.id())
        .bind(serde_json::to_string(&record.services)?)
        .bind(record.cost)
        .bind(record.served_at)
        .execute(&mut **self.writer().await?)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn load_customer(&mut self, customer_ref: &str) -> Result<Option<Customer>> {
        let query =
            sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = ?").bind(customer_ref);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(map_sqlx_error)?;

        Ok(row.map(CustomerRow::into_customer))
    }

    async fn set_pending_rating(
        &mut self,
        customer_ref: &str,
        pending: Option<&PendingRating>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE customers SET pending_barber_id = ?, pending_shop_id = ? WHERE id = ?",
        )
        .bind(pending.map(|p| p.barber_id.as_str()))
        .bind(pending.map(|p| p.shop_id.as_str()))
        .bind(customer_ref)
        .execute(&mut **self.writer().await?)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("customer {}", customer_ref)));
        }
        Ok(())
    }

    async fn advance_version(
        &mut self,
        shop_id: &str,
        expected: ShopVersion,
    ) -> Result<ShopVersion> {
        let result = sqlx::query("UPDATE shops SET version = version + 1 WHERE id = ? AND version = ?")
            .bind(shop_id)
            .bind(expected)
            .execute(&mut **self.writer().await?)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "shop {} moved past version {}",
                shop_id, expected
            )));
        }
        Ok(expected + 1)
    }
}
