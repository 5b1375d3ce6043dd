//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the oracle's workflows.
//!
//! Use cases:
//! - `PriceOrchestrator`: Reference-anchored price run
//! - `RefreshService`: Run + publish to the shared cache

pub mod price_orchestrator;
pub mod refresh;

pub use price_orchestrator::PriceOrchestrator;
pub use refresh::{RefreshError, RefreshService};
