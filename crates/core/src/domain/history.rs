// Service History Domain Model

use super::barber::BarberId;
use super::shop::ShopId;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Immutable record of one completed service.
///
/// Completion stores an independent copy per owner (shop, barber, customer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub services: Vec<String>,
    pub cost: f64,
    pub served_at: i64, // epoch ms
}

impl HistoryRecord {
    pub fn new(services: Vec<String>, cost: f64, served_at: i64) -> Self {
        Self {
            services,
            cost,
            served_at,
        }
    }

    /// UTC calendar date the service was recorded on
    pub fn served_on(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.served_at).map(|dt| dt.date_naive())
    }
}

/// Which history log a record copy is appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOwner {
    Shop(ShopId),
    Barber(BarberId),
    Customer(String),
}

impl HistoryOwner {
    pub fn kind(&self) -> &'static str {
        match self {
            HistoryOwner::Shop(_) => "SHOP",
            HistoryOwner::Barber(_) => "BARBER",
            HistoryOwner::Customer(_) => "CUSTOMER",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            HistoryOwner::Shop(id) | HistoryOwner::Barber(id) | HistoryOwner::Customer(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_served_on_uses_utc_date() {
        // 2024-03-09T23:59:59.999Z
        let record = HistoryRecord::new(vec!["Cut".into()], 20.0, 1_710_028_799_999);
        assert_eq!(
            record.served_on(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );

        let next = HistoryRecord::new(vec!["Cut".into()], 20.0, 1_710_028_800_000);
        assert_eq!(next.served_on(), NaiveDate::from_ymd_opt(2024, 3, 10));
    }
}
