// Row types and row -> domain conversion

use walkin_core::domain::{
    Barber, Customer, HistoryRecord, PendingRating, QueueEntry, RatingRecord, Shop, TrialStatus,
};
use walkin_core::error::{AppError, Result};

#[derive(sqlx::FromRow)]
pub(crate) struct ShopRow {
    id: String,
    name: String,
    trial_status: String,
    trial_ends_at: Option<i64>,
    version: i64,
    created_at: i64,
}

impl ShopRow {
    pub(crate) fn into_shop(self) -> Result<Shop> {
        let trial_status = self
            .trial_status
            .parse::<TrialStatus>()
            .map_err(|e| AppError::Database(format!("shop {}: {}", self.id, e)))?;

        Ok(Shop {
            id: self.id,
            name: self.name,
            trial_status,
            trial_ends_at: self.trial_ends_at,
            version: self.version,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EntryRow {
    id: String,
    shop_id: String,
    customer_ref: Option<String>,
    name: String,
    position: i64,
    code: Option<String>,
    services: String, // JSON array
    total_cost: f64,
    created_at: i64,
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        Ok(QueueEntry {
            services: serde_json::from_str(&self.services)?,
            id: self.id,
            shop_id: self.shop_id,
            customer_ref: self.customer_ref,
            name: self.name,
            position: self.position,
            code: self.code,
            total_cost: self.total_cost,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BarberRow {
    id: String,
    shop_id: String,
    name: String,
    customers_served: i64,
    total_stars: i64,
    rating_count: i64,
    created_at: i64,
}

impl BarberRow {
    pub(crate) fn into_barber(self) -> Barber {
        Barber {
            id: self.id,
            shop_id: self.shop_id,
            name: self.name,
            customers_served: self.customers_served,
            total_stars: self.total_stars,
            rating_count: self.rating_count,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: String,
    name: String,
    pending_barber_id: Option<String>,
    pending_shop_id: Option<String>,
    created_at: i64,
}

impl CustomerRow {
    pub(crate) fn into_customer(self) -> Customer {
        let pending_rating = match (self.pending_barber_id, self.pending_shop_id) {
            (Some(barber_id), Some(shop_id)) => Some(PendingRating { barber_id, shop_id }),
            _ => None,
        };
        Customer {
            id: self.id,
            name: self.name,
            pending_rating,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct HistoryRow {
    services: String, // JSON array
    cost: f64,
    served_at: i64,
}

impl HistoryRow {
    pub(crate) fn into_record(self) -> Result<HistoryRecord> {
        Ok(HistoryRecord::new(
            serde_json::from_str(&self.services)?,
            self.cost,
            self.served_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RatingRow {
    rating: i64,
    rated_at: i64,
}

impl RatingRow {
    pub(crate) fn into_record(self) -> RatingRecord {
        RatingRecord {
            rating: self.rating,
            rated_at: self.rated_at,
        }
    }
}
