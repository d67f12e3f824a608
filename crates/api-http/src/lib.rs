//! HTTP API Layer
//!
//! axum surface over the walk-in queue engine: JSON endpoints for the queue,
//! completion and provisioning use cases, plus the `/ws` live channel that
//! pushes `queueUpdated` signals.

pub mod error;
pub mod live;
pub mod routes;
pub mod server;
pub mod state;
pub mod types;
pub mod ws;

pub use live::LiveQueueHub;
pub use routes::router;
pub use server::{HttpServer, HttpServerConfig};
pub use state::{AppState, EngineSettings};
