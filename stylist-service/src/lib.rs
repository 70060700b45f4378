//! stylist-service: weather-aware outfit recommendation backend.
//!
//! The interesting parts are the usage-quota enforcement layer
//! (`services::quota`, `middleware::quota`, the window counters in
//! service-core) and the weather-aware item scoring engine
//! (`services::scoring`). Everything else is integration glue around
//! external collaborators: subscription state, the event store, the
//! weather provider, and the downstream generation pipeline.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::AppState;
