// Shop Domain Model

use serde::{Deserialize, Serialize};

/// Shop identifier
pub type ShopId = String;

/// Optimistic concurrency counter, advanced by every committed mutation
pub type ShopVersion = i64;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Longest trial a shop can be provisioned with
pub const MAX_TRIAL_DAYS: i64 = 36_500;

/// Trial / subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialStatus {
    Trial,
    Active,
    Expired,
}

impl std::fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrialStatus::Trial => write!(f, "trial"),
            TrialStatus::Active => write!(f, "active"),
            TrialStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for TrialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(TrialStatus::Trial),
            "active" => Ok(TrialStatus::Active),
            "expired" => Ok(TrialStatus::Expired),
            other => Err(format!("unknown trial status: {}", other)),
        }
    }
}

/// Shop Entity - the unit of queue isolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub trial_status: TrialStatus,
    pub trial_ends_at: Option<i64>, // epoch ms; None never expires
    pub version: ShopVersion,
    pub created_at: i64,
}

impl Shop {
    /// New shop on a trial of `trial_days` starting at `now`.
    ///
    /// The end date saturates rather than wrapping; callers bound
    /// `trial_days` by `MAX_TRIAL_DAYS`.
    pub fn new_trial(id: ShopId, name: String, now: i64, trial_days: i64) -> Self {
        Self {
            id,
            name,
            trial_status: TrialStatus::Trial,
            trial_ends_at: Some(now.saturating_add(trial_days.saturating_mul(MILLIS_PER_DAY))),
            version: 0,
            created_at: now,
        }
    }

    /// True once `now` has passed the trial end
    pub fn trial_over(&self, now: i64) -> bool {
        match self.trial_ends_at {
            Some(end) => now > end,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.trial_status == TrialStatus::Expired
    }
}
