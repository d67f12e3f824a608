// Submit Rating Use Case

use crate::application::commit::{require_non_empty, shop_not_found, Committed};
use crate::domain::{DomainError, Rating, RatingRecord};
use crate::error::{AppError, Result};
use crate::port::{TimeProvider, TransactionalShopStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRatingRequest {
    pub shop_id: String,
    pub customer_ref: String,
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub barber_id: String,
    pub average_rating: f64,
}

pub fn validate_request(req: &SubmitRatingRequest) -> Result<Rating> {
    require_non_empty(&req.shop_id, "shopId")?;
    require_non_empty(&req.customer_ref, "customerRef")?;
    Ok(Rating::new(req.rating)?)
}

/// Apply the customer's pending rating to the referenced barber and clear it
pub async fn execute(
    store: &dyn TransactionalShopStore,
    time_provider: &dyn TimeProvider,
    req: &SubmitRatingRequest,
    rating: Rating,
) -> Result<Committed<RatingOutcome>> {
    let mut tx = store.begin_transaction().await?;

    let shop = tx
        .load_shop(&req.shop_id)
        .await?
        .ok_or_else(|| shop_not_found(&req.shop_id))?;

    let customer = tx
        .load_customer(&req.customer_ref)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer not found: {}", req.customer_ref)))?;

    let pending = customer
        .pending_rating
        .ok_or_else(|| DomainError::NoPendingRating(customer.id.clone()))?;

    let mut barber = tx
        .load_barber(&shop.id, &pending.barber_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Barber not found: {}", pending.barber_id)))?;

    barber.record_rating(rating);
    tx.save_barber_counters(&barber).await?;
    tx.append_rating(
        &barber.id,
        &RatingRecord {
            rating: rating.stars(),
            rated_at: time_provider.now_millis(),
        },
    )
    .await?;
    tx.set_pending_rating(&customer.id, None).await?;

    let version = tx.advance_version(&shop.id, shop.version).await?;
    tx.commit().await?;

    let average_rating = barber.average_rating().unwrap_or(rating.stars() as f64);
    Ok(Committed::new(
        RatingOutcome {
            barber_id: barber.id,
            average_rating,
        },
        version,
    ))
}
