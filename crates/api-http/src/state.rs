//! Shared handler state and use-case wiring

use crate::live::LiveQueueHub;
use std::sync::Arc;
use walkin_core::application::{
    CommitRetryPolicy, CompletionService, ProvisioningService, QueueService, ViewService,
    DEFAULT_TRIAL_DAYS,
};
use walkin_core::port::{IdProvider, QueueNotifier, ShopStore, TimeProvider, TransactionalShopStore};

/// Knobs the daemon reads from its environment
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub retry: CommitRetryPolicy,
    pub trial_days: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retry: CommitRetryPolicy::default(),
            trial_days: DEFAULT_TRIAL_DAYS,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<QueueService>,
    pub completion: Arc<CompletionService>,
    pub provisioning: Arc<ProvisioningService>,
    pub views: Arc<ViewService>,
    pub hub: LiveQueueHub,
}

impl AppState {
    /// Wire every use case against one store, with the live hub as notifier
    pub fn new<S>(
        store: Arc<S>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        settings: EngineSettings,
    ) -> Self
    where
        S: ShopStore + TransactionalShopStore + 'static,
    {
        let hub = LiveQueueHub::new();
        let notifier: Arc<dyn QueueNotifier> = Arc::new(hub.clone());
        let reader: Arc<dyn ShopStore> = store.clone();

        Self {
            queue: Arc::new(QueueService::new(
                store.clone(),
                notifier.clone(),
                id_provider.clone(),
                time_provider.clone(),
                settings.retry.clone(),
            )),
            completion: Arc::new(CompletionService::new(
                store,
                notifier,
                time_provider.clone(),
                settings.retry,
            )),
            provisioning: Arc::new(ProvisioningService::new(
                reader.clone(),
                id_provider,
                time_provider,
                settings.trial_days,
            )),
            views: Arc::new(ViewService::new(reader)),
            hub,
        }
    }
}
