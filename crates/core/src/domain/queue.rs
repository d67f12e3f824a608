// Queue Domain Model

use super::error::{DomainError, Result};
use super::shop::ShopId;
use serde::{Deserialize, Serialize};

/// Queue entry ID (UUID v4)
pub type EntryId = String;

/// External customer identity; guests carry a `=`-suffixed token
pub type CustomerRef = String;

/// Position key, unique within one shop's queue at rest
pub type Position = i64;

/// A customer waiting in one shop's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub shop_id: ShopId,
    pub customer_ref: Option<CustomerRef>,
    pub name: String,
    pub position: Position,
    pub code: Option<String>,
    pub services: Vec<String>,
    pub total_cost: f64,
    pub created_at: i64, // epoch ms
}

impl QueueEntry {
    pub fn belongs_to(&self, customer_ref: &str) -> bool {
        self.customer_ref.as_deref() == Some(customer_ref)
    }
}

/// Next order key for a queue: max existing key + 1, or 1 for an empty queue.
///
/// Never collides with a key present in `entries`. Callers must hold the
/// shop's write section for the result to stay free until insert.
pub fn next_position(entries: &[QueueEntry]) -> Position {
    entries.iter().map(|e| e.position).max().unwrap_or(0) + 1
}

/// Read-only snapshot of a shop's queue, ascending by position key.
///
/// Ties (only possible with corrupted data) fall back to creation time, then id,
/// so the order is still total and deterministic.
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    pub fn new(mut entries: Vec<QueueEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<QueueEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_position(&self) -> Position {
        next_position(&self.entries)
    }

    pub fn head(&self) -> Option<&QueueEntry> {
        self.entries.first()
    }

    pub fn find(&self, entry_id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// First entry in position order owned by `customer_ref`
    pub fn find_by_customer(&self, customer_ref: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.belongs_to(customer_ref))
    }

    /// Plan the swap of `entry_id` with its immediate successor
    pub fn plan_move_down(&self, entry_id: &str) -> Result<PositionSwap> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| DomainError::EntryNotFound(entry_id.to_string()))?;

        let moved = &self.entries[idx];
        let next = self
            .entries
            .get(idx + 1)
            .ok_or_else(|| DomainError::AlreadyAtEnd(entry_id.to_string()))?;

        Ok(PositionSwap {
            moved_id: moved.id.clone(),
            moved_to: next.position,
            displaced_id: next.id.clone(),
            displaced_to: moved.position,
        })
    }
}

/// Exchange of position keys between two adjacent entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSwap {
    pub moved_id: EntryId,
    pub moved_to: Position,
    pub displaced_id: EntryId,
    pub displaced_to: Position,
}
