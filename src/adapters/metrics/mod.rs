//! Metrics Adapter
//!
//! Prometheus metrics for provider outcomes and run health, exposed by
//! the HTTP server on `/metrics`.

pub mod prometheus;

pub use self::prometheus::MetricsRegistry;
