//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O) and hosts the
//! inbound HTTP surface.
//!
//! Adapter categories:
//! - `sources`: DexScreener and GeckoTerminal quote providers
//! - `registry`: Token list loading
//! - `persistence`: Atomic JSON snapshot cache
//! - `http`: Refresh, snapshot, health and metrics endpoints
//! - `metrics`: Prometheus registry

pub mod http;
pub mod metrics;
pub mod persistence;
pub mod registry;
pub mod sources;
