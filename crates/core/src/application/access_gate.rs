// Trial / access gate, evaluated before queue mutations

use crate::application::commit::shop_not_found;
use crate::domain::Shop;
use crate::error::{AppError, Result};
use crate::port::{ShopStore, TimeProvider};
use std::sync::Arc;
use tracing::{debug, info};

pub struct AccessGate {
    store: Arc<dyn ShopStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn ShopStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            store,
            time_provider,
        }
    }

    /// Pass through with the shop, or reject.
    ///
    /// Only the trial-end timestamp decides. A lapsed trial is written back
    /// as `expired` (at most once) and the request fails with Forbidden
    /// before any queue state is touched; the stored status is never read.
    pub async fn check(&self, shop_id: &str) -> Result<Shop> {
        let shop = self
            .store
            .find_shop(shop_id)
            .await?
            .ok_or_else(|| shop_not_found(shop_id))?;

        let now = self.time_provider.now_millis();
        if !shop.trial_over(now) {
            return Ok(shop);
        }

        if self.store.mark_trial_expired(shop_id).await? {
            info!(
                shop_id = %shop_id,
                trial_ends_at = ?shop.trial_ends_at,
                "Trial ended, shop marked expired"
            );
        } else {
            debug!(shop_id = %shop_id, "Trial already marked expired");
        }

        Err(trial_expired())
    }
}

fn trial_expired() -> AppError {
    AppError::Forbidden("Trial period has expired".to_string())
}
