// SQLite ShopStore Implementation

use crate::map_sqlx_error;
use crate::rows::{BarberRow, CustomerRow, EntryRow, HistoryRow, RatingRow, ShopRow};
use crate::{ShopLocks, SqliteShopTransaction};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use walkin_core::domain::{
    Barber, Customer, HistoryOwner, HistoryRecord, QueueEntry, RatingRecord, Shop, TrialStatus,
};
use walkin_core::error::Result;
use walkin_core::port::{ShopStore, ShopTransaction, TransactionalShopStore};

#[derive(Clone)]
pub struct SqliteShopStore {
    pool: SqlitePool,
    locks: Arc<ShopLocks>,
}

impl SqliteShopStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(ShopLocks::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TransactionalShopStore for SqliteShopStore {
    async fn begin_transaction(&self) -> Result<Box<dyn ShopTransaction>> {
        Ok(Box::new(SqliteShopTransaction::new(
            self.pool.clone(),
            Arc::clone(&self.locks),
        )))
    }
}

#[async_trait]
impl ShopStore for SqliteShopStore {
    async fn create_shop(&self, shop: &Shop) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shops (id, name, trial_status, trial_ends_at, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(shop.trial_status.to_string())
        .bind(shop.trial_ends_at)
        .bind(shop.version)
        .bind(shop.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_shop(&self, shop_id: &str) -> Result<Option<Shop>> {
        let row: Option<ShopRow> = sqlx::query_as("SELECT * FROM shops WHERE id = ?")
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ShopRow::into_shop).transpose()
    }

    async fn list_open_shops(&self) -> Result<Vec<Shop>> {
        let rows: Vec<ShopRow> =
            sqlx::query_as("SELECT * FROM shops WHERE trial_status != ? ORDER BY created_at ASC")
                .bind(TrialStatus::Expired.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(ShopRow::into_shop).collect()
    }

    async fn mark_trial_expired(&self, shop_id: &str) -> Result<bool> {
        let expired = TrialStatus::Expired.to_string();
        let result = sqlx::query("UPDATE shops SET trial_status = ? WHERE id = ? AND trial_status != ?")
            .bind(&expired)
            .bind(shop_id)
            .bind(&expired)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_queue(&self, shop_id: &str) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT * FROM queue_entries WHERE shop_id = ? ORDER BY position ASC",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn add_barber(&self, barber: &Barber) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO barbers (
                id, shop_id, name, customers_served, total_stars, rating_count, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&barber.id)
        .bind(&barber.shop_id)
        .bind(&barber.name)
        .bind(barber.customers_served)
        .bind(barber.total_stars)
        .bind(barber.rating_count)
        .bind(barber.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_barbers(&self, shop_id: &str) -> Result<Vec<Barber>> {
        let rows: Vec<BarberRow> =
            sqlx::query_as("SELECT * FROM barbers WHERE shop_id = ? ORDER BY created_at ASC")
                .bind(shop_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BarberRow::into_barber).collect())
    }

    async fn find_barber(&self, shop_id: &str, barber_id: &str) -> Result<Option<Barber>> {
        let row: Option<BarberRow> =
            sqlx::query_as("SELECT * FROM barbers WHERE id = ? AND shop_id = ?")
                .bind(barber_id)
                .bind(shop_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(BarberRow::into_barber))
    }

    async fn barber_ratings(&self, barber_id: &str) -> Result<Vec<RatingRecord>> {
        let rows: Vec<RatingRow> = sqlx::query_as(
            "SELECT rating, rated_at FROM barber_ratings WHERE barber_id = ? ORDER BY id ASC",
        )
        .bind(barber_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(RatingRow::into_record).collect())
    }

    async fn history(&self, owner: &HistoryOwner) -> Result<Vec<HistoryRecord>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT services, cost, served_at FROM history_records
            WHERE owner_kind = ? AND owner_id = ?
            ORDER BY served_at ASC, id ASC
            "#,
        )
        .bind(owner.kind())
        .bind(owner.id())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(HistoryRow::into_record).collect()
    }

    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let pending = customer.pending_rating.as_ref();
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, pending_barber_id, pending_shop_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(pending.map(|p| p.barber_id.as_str()))
        .bind(pending.map(|p| p.shop_id.as_str()))
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_customer(&self, customer_ref: &str) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE id = ?")
            .bind(customer_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(CustomerRow::into_customer))
    }

    async fn clear_pending_rating(&self, customer_ref: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE customers SET pending_barber_id = NULL, pending_shop_id = NULL WHERE id = ?",
        )
        .bind(customer_ref)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use walkin_core::domain::{PendingRating, PositionSwap};
    use std::time::Duration;
    use tokio::time::timeout;
    use walkin_core::error::AppError;

    async fn setup_test_db() -> (SqliteShopStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("store.db").display());
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (SqliteShopStore::new(pool), dir)
    }

    fn entry(id: &str, position: i64, customer: Option<&str>) -> QueueEntry {
        QueueEntry {
            id: id.to_string(),
            shop_id: "s1".to_string(),
            customer_ref: customer.map(str::to_string),
            name: id.to_uppercase(),
            position,
            code: Some("T-7".to_string()),
            services: vec!["Haircut".to_string(), "Wash".to_string()],
            total_cost: 30.5,
            created_at: 100 + position,
        }
    }

    async fn seed(store: &SqliteShopStore) {
        store
            .create_shop(&Shop::new_trial("s1".into(), "Fade Lab".into(), 0, 30))
            .await
            .unwrap();
        store
            .add_barber(&Barber::new("b1".into(), "s1".into(), "Sam".into(), 0))
            .await
            .unwrap();
        store
            .create_customer(&Customer::new("c1".into(), "Ana".into(), 0))
            .await
            .unwrap();
    }

    async fn insert_committed(store: &SqliteShopStore, entries: &[QueueEntry]) {
        let mut tx = store.begin_transaction().await.unwrap();
        for e in entries {
            tx.insert_entry(e).await.unwrap();
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_shop_round_trip_and_expiry() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let shop = store.find_shop("s1").await.unwrap().unwrap();
        assert_eq!(shop.name, "Fade Lab");
        assert_eq!(shop.trial_status, TrialStatus::Trial);
        assert_eq!(store.list_open_shops().await.unwrap().len(), 1);

        assert!(store.mark_trial_expired("s1").await.unwrap());
        assert!(!store.mark_trial_expired("s1").await.unwrap());
        assert!(store.list_open_shops().await.unwrap().is_empty());
        assert!(store.find_shop("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_round_trip_in_position_order() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;
        insert_committed(&store, &[entry("b", 2, None), entry("a", 1, Some("c1"))]).await;

        let queue = store.list_queue("s1").await.unwrap();
        assert_eq!(queue, vec![entry("a", 1, Some("c1")), entry("b", 2, None)]);
    }

    #[tokio::test]
    async fn test_duplicate_position_is_conflict() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;
        insert_committed(&store, &[entry("a", 1, None)]).await;

        let mut tx = store.begin_transaction().await.unwrap();
        let err = tx.insert_entry(&entry("b", 1, None)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_swap_positions_respects_unique_index() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;
        insert_committed(&store, &[entry("a", 1, None), entry("b", 2, None)]).await;

        let mut tx = store.begin_transaction().await.unwrap();
        tx.swap_positions(&PositionSwap {
            moved_id: "a".into(),
            moved_to: 2,
            displaced_id: "b".into(),
            displaced_to: 1,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let ids: Vec<_> = store
            .list_queue("s1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.id, e.position))
            .collect();
        assert_eq!(ids, vec![("b".to_string(), 1), ("a".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_advance_version_detects_stale_read() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let mut tx = store.begin_transaction().await.unwrap();
        let shop = tx.load_shop("s1").await.unwrap().unwrap();
        assert_eq!(tx.advance_version("s1", shop.version).await.unwrap(), 1);
        let err = tx.advance_version("s1", shop.version).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        tx.commit().await.unwrap();

        assert_eq!(store.find_shop("s1").await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_open_section_does_not_stall_other_shop() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;
        store
            .create_shop(&Shop::new_trial("s2".into(), "Clip Joint".into(), 0, 30))
            .await
            .unwrap();

        let mut held = store.begin_transaction().await.unwrap();
        held.load_shop("s1").await.unwrap().unwrap();

        let other = async {
            let mut tx = store.begin_transaction().await.unwrap();
            let shop = tx.load_shop("s2").await.unwrap().unwrap();
            let mut e = entry("x", 1, None);
            e.shop_id = "s2".to_string();
            tx.insert_entry(&e).await.unwrap();
            tx.advance_version("s2", shop.version).await.unwrap();
            tx.commit().await.unwrap();
        };
        timeout(Duration::from_millis(1_500), other).await.unwrap();

        // Same shop queues behind the open section
        let same = async {
            let mut tx = store.begin_transaction().await.unwrap();
            tx.load_shop("s1").await.unwrap();
        };
        assert!(timeout(Duration::from_millis(100), same).await.is_err());

        held.commit().await.unwrap();
        assert_eq!(store.list_queue("s2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        {
            let mut tx = store.begin_transaction().await.unwrap();
            tx.load_shop("s1").await.unwrap();
            tx.insert_entry(&entry("a", 1, None)).await.unwrap();
            // dropped without commit
        }

        assert!(store.list_queue("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_entry_operations_are_not_found() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let mut tx = store.begin_transaction().await.unwrap();
        assert!(matches!(
            tx.delete_entry("ghost").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            tx.update_entry_services("ghost", &[], 0.0).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_history_copies_are_independent() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let record = HistoryRecord::new(vec!["Cut".into()], 20.0, 1_000);
        let mut tx = store.begin_transaction().await.unwrap();
        tx.append_history(&HistoryOwner::Shop("s1".into()), &record)
            .await
            .unwrap();
        tx.append_history(&HistoryOwner::Barber("b1".into()), &record)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            store.history(&HistoryOwner::Shop("s1".into())).await.unwrap(),
            vec![record.clone()]
        );
        assert_eq!(
            store.history(&HistoryOwner::Barber("b1".into())).await.unwrap(),
            vec![record]
        );
        assert!(store
            .history(&HistoryOwner::Customer("c1".into()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_pending_rating_set_and_clear() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let pending = PendingRating {
            barber_id: "b1".into(),
            shop_id: "s1".into(),
        };
        let mut tx = store.begin_transaction().await.unwrap();
        tx.set_pending_rating("c1", Some(&pending)).await.unwrap();
        tx.commit().await.unwrap();

        let customer = store.find_customer("c1").await.unwrap().unwrap();
        assert_eq!(customer.pending_rating, Some(pending));

        assert!(store.clear_pending_rating("c1").await.unwrap());
        assert!(store.clear_pending_rating("c1").await.unwrap());
        assert!(!store.clear_pending_rating("nobody").await.unwrap());
        assert!(store
            .find_customer("c1")
            .await
            .unwrap()
            .unwrap()
            .pending_rating
            .is_none());
    }

    #[tokio::test]
    async fn test_barber_counters_and_ratings() {
        let (store, _dir) = setup_test_db().await;
        seed(&store).await;

        let mut tx = store.begin_transaction().await.unwrap();
        let mut barber = tx.load_barber("s1", "b1").await.unwrap().unwrap();
        barber.record_service();
        barber.total_stars = 4;
        barber.rating_count = 1;
        tx.save_barber_counters(&barber).await.unwrap();
        tx.append_rating(
            "b1",
            &RatingRecord {
                rating: 4,
                rated_at: 10,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let stored = store.find_barber("s1", "b1").await.unwrap().unwrap();
        assert_eq!(stored.customers_served, 1);
        assert_eq!(stored.average_rating(), Some(4.0));
        assert_eq!(store.barber_ratings("b1").await.unwrap().len(), 1);

        // Barber lookups are scoped to their shop
        assert!(store.find_barber("other", "b1").await.unwrap().is_none());
    }
}
