// Commit results and post-commit change publication

use crate::domain::ShopVersion;
use crate::error::AppError;
use crate::port::{QueueChanged, QueueNotifier};
use tracing::{debug, warn};

/// Value produced by a committed mutation, with the shop version it committed at
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    pub version: ShopVersion,
}

impl<T> Committed<T> {
    pub fn new(value: T, version: ShopVersion) -> Self {
        Self { value, version }
    }
}

/// Fire-and-forget publish after a commit. Failures are logged, never returned.
pub async fn publish_change(notifier: &dyn QueueNotifier, shop_id: &str, version: ShopVersion) {
    let event = QueueChanged::new(shop_id, version);
    match notifier.notify_shop_queue_changed(event).await {
        Ok(()) => debug!(shop_id = %shop_id, version, "Queue change published"),
        Err(e) => warn!(
            shop_id = %shop_id,
            version,
            error = %e,
            "Queue change notification failed"
        ),
    }
}

pub(crate) fn shop_not_found(shop_id: &str) -> AppError {
    AppError::NotFound(format!("Shop not found: {}", shop_id))
}

/// Shared field checks for request structs
pub(crate) fn require_non_empty(value: &str, field: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_valid_cost(cost: f64, field: &str) -> crate::Result<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}
