//! Shared engine wiring over a throwaway SQLite file

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;
use walkin_core::application::{
    CommitRetryPolicy, CompletionService, InsertRequest, ProvisioningService, QueueService,
    ViewService,
};
use walkin_core::domain::{QueueEntry, Shop};
use walkin_core::port::id_provider::UuidProvider;
use walkin_core::port::notifier::mocks::RecordingNotifier;
use walkin_core::port::time_provider::mocks::FixedTimeProvider;
use walkin_core::port::ShopStore;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteShopStore};

// 2023-11-14T22:13:20Z
pub const NOW: i64 = 1_700_000_000_000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct Engine {
    pub queue: Arc<QueueService>,
    pub completion: Arc<CompletionService>,
    pub provisioning: ProvisioningService,
    pub views: ViewService,
    pub store: Arc<SqliteShopStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub time: Arc<FixedTimeProvider>,
    pub db_url: String,
    _dir: TempDir,
}

pub async fn engine() -> Engine {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}", dir.path().join("queue.db").display());
    let pool = create_pool(&db_url).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = Arc::new(SqliteShopStore::new(pool));
    let notifier = Arc::new(RecordingNotifier::new());
    let time = Arc::new(FixedTimeProvider::new(NOW));
    // Generous budget: races below are meant to succeed, not exhaust retries
    let retry = CommitRetryPolicy::new(50, 2);

    Engine {
        queue: Arc::new(QueueService::new(
            store.clone(),
            notifier.clone(),
            Arc::new(UuidProvider),
            time.clone(),
            retry.clone(),
        )),
        completion: Arc::new(CompletionService::new(
            store.clone(),
            notifier.clone(),
            time.clone(),
            retry,
        )),
        provisioning: ProvisioningService::new(
            store.clone(),
            Arc::new(UuidProvider),
            time.clone(),
            30,
        ),
        views: ViewService::new(store.clone()),
        store,
        notifier,
        time,
        db_url,
        _dir: dir,
    }
}

impl Engine {
    pub async fn shop(&self) -> Shop {
        self.provisioning.create_shop("Fade Factory", None).await.unwrap()
    }

    pub async fn join(&self, shop_id: &str, name: &str, customer_ref: Option<&str>) -> QueueEntry {
        self.queue
            .insert(insert_request(shop_id, name, customer_ref))
            .await
            .unwrap()
    }

    pub async fn names(&self, shop_id: &str) -> Vec<String> {
        self.queue
            .list_sorted(shop_id)
            .await
            .unwrap()
            .into_entries()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    pub async fn positions(&self, shop_id: &str) -> Vec<i64> {
        let mut positions: Vec<i64> = self
            .store
            .list_queue(shop_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.position)
            .collect();
        positions.sort_unstable();
        positions
    }
}

pub fn insert_request(shop_id: &str, name: &str, customer_ref: Option<&str>) -> InsertRequest {
    InsertRequest {
        shop_id: shop_id.to_string(),
        name: name.to_string(),
        customer_ref: customer_ref.map(str::to_string),
        services: vec!["Haircut".to_string()],
        code: None,
        total_cost: 15.0,
    }
}
