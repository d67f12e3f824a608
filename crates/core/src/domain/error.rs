// Domain Error Types

use crate::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Item is already at the end of the queue: {0}")]
    AlreadyAtEnd(String),

    #[error("Queue entry not found: {0}")]
    EntryNotFound(String),

    #[error("No pending rating for customer: {0}")]
    NoPendingRating(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::AlreadyAtEnd(_) | DomainError::NoPendingRating(_) => {
                ErrorKind::InvalidOperation
            }
            DomainError::EntryNotFound(_) => ErrorKind::NotFound,
            DomainError::InvalidRating(_) => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
