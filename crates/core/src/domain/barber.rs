// Barber Domain Model

use super::error::{DomainError, Result};
use super::shop::ShopId;
use serde::{Deserialize, Serialize};

/// Barber identifier
pub type BarberId = String;

/// Star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(stars: i64) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&stars) {
            return Err(DomainError::InvalidRating(stars));
        }
        Ok(Self(stars as u8))
    }

    pub fn stars(&self) -> i64 {
        self.0 as i64
    }
}

/// One rating left by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub rating: i64,
    pub rated_at: i64,
}

/// Service staff member of one shop.
///
/// Counters are mutated only by service completion and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barber {
    pub id: BarberId,
    pub shop_id: ShopId,
    pub name: String,
    pub customers_served: i64,
    pub total_stars: i64,
    pub rating_count: i64,
    pub created_at: i64,
}

impl Barber {
    pub fn new(id: BarberId, shop_id: ShopId, name: String, created_at: i64) -> Self {
        Self {
            id,
            shop_id,
            name,
            customers_served: 0,
            total_stars: 0,
            rating_count: 0,
            created_at,
        }
    }

    pub fn record_service(&mut self) {
        self.customers_served += 1;
    }

    pub fn record_rating(&mut self, rating: Rating) {
        self.total_stars += rating.stars();
        self.rating_count += 1;
    }

    /// Star total / rating count; None before the first rating
    pub fn average_rating(&self) -> Option<f64> {
        if self.rating_count == 0 {
            return None;
        }
        Some(self.total_stars as f64 / self.rating_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
    }

    #[test]
    fn test_average_rating() {
        let mut barber = Barber::new("b1".into(), "s1".into(), "Sam".into(), 0);
        assert_eq!(barber.average_rating(), None);

        barber.record_rating(Rating::new(5).unwrap());
        barber.record_rating(Rating::new(4).unwrap());
        assert_eq!(barber.total_stars, 9);
        assert_eq!(barber.rating_count, 2);
        assert_eq!(barber.average_rating(), Some(4.5));
    }

    #[test]
    fn test_record_service_counts() {
        let mut barber = Barber::new("b1".into(), "s1".into(), "Sam".into(), 0);
        barber.record_service();
        barber.record_service();
        assert_eq!(barber.customers_served, 2);
    }
}
