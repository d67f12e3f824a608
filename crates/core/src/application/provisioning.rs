// Provisioning - minimal shop / barber / customer records for the engine

use crate::application::commit::{require_non_empty, shop_not_found};
use crate::domain::{Barber, Customer, Shop, MAX_TRIAL_DAYS};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ShopStore, TimeProvider};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_TRIAL_DAYS: i64 = 30;

pub struct ProvisioningService {
    store: Arc<dyn ShopStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    default_trial_days: i64,
}

impl ProvisioningService {
    pub fn new(
        store: Arc<dyn ShopStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        default_trial_days: i64,
    ) -> Self {
        Self {
            store,
            id_provider,
            time_provider,
            default_trial_days,
        }
    }

    /// Create a shop whose trial ends `trial_days` (or the default) from now
    pub async fn create_shop(&self, name: &str, trial_days: Option<i64>) -> Result<Shop> {
        require_non_empty(name, "name")?;
        let trial_days = trial_days.unwrap_or(self.default_trial_days);
        if !(0..=MAX_TRIAL_DAYS).contains(&trial_days) {
            return Err(AppError::Validation(format!(
                "trialDays must be between 0 and {}",
                MAX_TRIAL_DAYS
            )));
        }

        let shop = Shop::new_trial(
            self.id_provider.generate_id(),
            name.trim().to_string(),
            self.time_provider.now_millis(),
            trial_days,
        );
        self.store.create_shop(&shop).await?;

        info!(shop_id = %shop.id, trial_days, "Shop provisioned");
        Ok(shop)
    }

    pub async fn add_barber(&self, shop_id: &str, name: &str) -> Result<Barber> {
        require_non_empty(shop_id, "shopId")?;
        require_non_empty(name, "name")?;
        if self.store.find_shop(shop_id).await?.is_none() {
            return Err(shop_not_found(shop_id));
        }

        let barber = Barber::new(
            self.id_provider.generate_id(),
            shop_id.to_string(),
            name.trim().to_string(),
            self.time_provider.now_millis(),
        );
        self.store.add_barber(&barber).await?;

        info!(shop_id = %shop_id, barber_id = %barber.id, "Barber added");
        Ok(barber)
    }

    pub async fn create_customer(&self, name: &str) -> Result<Customer> {
        require_non_empty(name, "name")?;
        let customer = Customer::new(
            self.id_provider.generate_id(),
            name.trim().to_string(),
            self.time_provider.now_millis(),
        );
        self.store.create_customer(&customer).await?;
        Ok(customer)
    }
}
