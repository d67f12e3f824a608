// Application Layer - Use Cases and Business Logic

pub mod access_gate;
pub mod commit;
pub mod completion;
pub mod provisioning;
pub mod queue;
pub mod retry;
pub mod views;

// Re-exports
pub use access_gate::AccessGate;
pub use commit::Committed;
pub use completion::{
    CompleteServiceRequest, CompletionService, CompletionSummary, RatingOutcome,
    SubmitRatingRequest,
};
pub use provisioning::{ProvisioningService, DEFAULT_TRIAL_DAYS};
pub use queue::{InsertRequest, QueueService, RemoveTarget, UpdateServicesRequest};
pub use retry::{CommitRetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
pub use views::{parse_history_date, BarberProfile, ViewService};
