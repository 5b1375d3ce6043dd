//! HTTP Adapter - axum Server
//!
//! Exposes the refresh trigger, the in-memory snapshot, health probes
//! and Prometheus metrics.

pub mod health;
pub mod server;

pub use health::HealthState;
pub use server::{router, serve, AppState};
