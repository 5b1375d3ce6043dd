//! Health Probes - Liveness and Readiness
//!
//! `/live` answers as long as the process runs. `/ready` turns 503 once
//! graceful shutdown begins or the snapshot cache becomes unusable.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::server::AppState;

/// Shared health flags polled by readiness probes.
#[derive(Debug)]
pub struct HealthState {
    /// Set when graceful shutdown starts.
    shutting_down: AtomicBool,
}

impl HealthState {
    /// Create a new health state (ready by default).
    pub fn new() -> Self {
        Self {
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Flag the process as draining.
    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness probe: always returns 200 if the process is running.
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only while not draining and the cache is usable.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if !state.health.is_shutting_down() && state.cache.is_healthy().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}
