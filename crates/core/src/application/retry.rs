// Optimistic commit retry

use crate::error::{AppError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 10;

// Exponent cap keeps the delay finite for large attempt counts
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Re-runs a shop's critical section after it lost an optimistic race.
///
/// Only `AppError::Conflict` is retried. Every other outcome is returned as-is.
/// Backoff: `base_delay * 2^(attempt - 1) * (0.9..=1.1)`.
#[derive(Debug, Clone)]
pub struct CommitRetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl Default for CommitRetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY_MS)
    }
}

impl CommitRetryPolicy {
    /// # Arguments
    /// * `max_attempts` - Total tries including the first (at least 1)
    /// * `base_delay_ms` - Delay before the first retry
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Jittered delay before retry number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let base = self.base_delay_ms as f64 * 2f64.powi(exponent as i32);

        // ±10% jitter so racing writers do not retry in lockstep
        let jitter = rand::thread_rng().gen_range(0.9..=1.1);
        Duration::from_micros((base * jitter * 1000.0) as u64)
    }

    /// Run `op` until it succeeds, fails with a non-conflict error, or the
    /// attempts run out. Exhaustion surfaces as `AppError::Internal`.
    pub async fn run<T, F, Fut>(&self, shop_id: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(e) if e.is_conflict() => {
                    debug!(shop_id = %shop_id, attempt, error = %e, "Commit conflict");

                    if attempt >= self.max_attempts {
                        warn!(
                            shop_id = %shop_id,
                            attempts = attempt,
                            "Giving up after repeated commit conflicts"
                        );
                        return Err(AppError::Internal(format!(
                            "shop {} is busy, gave up after {} attempts",
                            shop_id, attempt
                        )));
                    }

                    let delay = self.backoff_delay(attempt);
                    info!(
                        shop_id = %shop_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying shop mutation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
