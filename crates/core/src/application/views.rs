// Read views over staff, ratings and history

use crate::application::commit::shop_not_found;
use crate::domain::{Barber, HistoryOwner, HistoryRecord, RatingRecord, Shop};
use crate::error::{AppError, Result};
use crate::port::ShopStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// Barber with its full history and ratings
#[derive(Debug, Clone, Serialize)]
pub struct BarberProfile {
    pub barber: Barber,
    pub average_rating: Option<f64>,
    pub history: Vec<HistoryRecord>,
    pub ratings: Vec<RatingRecord>,
}

pub struct ViewService {
    store: Arc<dyn ShopStore>,
}

impl ViewService {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    pub async fn open_shops(&self) -> Result<Vec<Shop>> {
        self.store.list_open_shops().await
    }

    pub async fn barbers(&self, shop_id: &str) -> Result<Vec<Barber>> {
        self.require_shop(shop_id).await?;
        self.store.list_barbers(shop_id).await
    }

    pub async fn barber_profile(&self, shop_id: &str, barber_id: &str) -> Result<BarberProfile> {
        let barber = self
            .store
            .find_barber(shop_id, barber_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Barber not found: {}", barber_id)))?;

        let history = self
            .store
            .history(&HistoryOwner::Barber(barber.id.clone()))
            .await?;
        let ratings = self.store.barber_ratings(&barber.id).await?;

        Ok(BarberProfile {
            average_rating: barber.average_rating(),
            barber,
            history,
            ratings,
        })
    }

    /// Shop history, optionally limited to one UTC calendar date
    pub async fn shop_history(
        &self,
        shop_id: &str,
        on: Option<NaiveDate>,
    ) -> Result<Vec<HistoryRecord>> {
        self.require_shop(shop_id).await?;
        let records = self
            .store
            .history(&HistoryOwner::Shop(shop_id.to_string()))
            .await?;

        Ok(match on {
            Some(date) => records
                .into_iter()
                .filter(|r| r.served_on() == Some(date))
                .collect(),
            None => records,
        })
    }

    async fn require_shop(&self, shop_id: &str) -> Result<()> {
        match self.store.find_shop(shop_id).await? {
            Some(_) => Ok(()),
            None => Err(shop_not_found(shop_id)),
        }
    }
}

/// Parse a `YYYY-MM-DD` path segment
pub fn parse_history_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}
