// Domain Layer - Pure business logic and entities

pub mod barber;
pub mod customer;
pub mod error;
pub mod history;
pub mod queue;
pub mod services;
pub mod shop;

// Re-exports
pub use barber::{Barber, BarberId, Rating, RatingRecord};
pub use customer::{is_guest_ref, Customer, PendingRating, GUEST_SUFFIX};
pub use error::DomainError;
pub use history::{HistoryOwner, HistoryRecord};
pub use queue::{next_position, CustomerRef, EntryId, Position, PositionSwap, QueueEntry, QueueSnapshot};
pub use services::{normalize_services, split_service_list};
pub use shop::{Shop, ShopId, ShopVersion, TrialStatus, MAX_TRIAL_DAYS};
