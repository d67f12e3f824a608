// Customer Domain Model (collaborator record)

use super::barber::BarberId;
use super::shop::ShopId;
use serde::{Deserialize, Serialize};

/// Guest identities end with this sentinel and have no stored record
pub const GUEST_SUFFIX: char = '=';

pub fn is_guest_ref(customer_ref: &str) -> bool {
    customer_ref.ends_with(GUEST_SUFFIX)
}

/// A rating the customer owes after a completed service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRating {
    pub barber_id: BarberId,
    pub shop_id: ShopId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub pending_rating: Option<PendingRating>,
    pub created_at: i64,
}

impl Customer {
    pub fn new(id: String, name: String, created_at: i64) -> Self {
        Self {
            id,
            name,
            pending_rating: None,
            created_at,
        }
    }
}
