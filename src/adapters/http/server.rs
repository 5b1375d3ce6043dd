//! HTTP Server - Refresh, Snapshot, Health and Metrics Endpoints
//!
//! Routes:
//! - `GET|POST /api/cron/update-prices`: run + publish (cron trigger)
//! - `GET /api/prices`: last assembled snapshot, no fetch
//! - `GET /live`, `GET /ready`: probes
//! - `GET /metrics`: Prometheus text format

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::health::{liveness, readiness, HealthState};
use crate::adapters::metrics::MetricsRegistry;
use crate::ports::price_cache::PriceCache;
use crate::usecases::refresh::{RefreshError, RefreshService};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub refresh: Arc<RefreshService>,
    pub cache: Arc<dyn PriceCache>,
    pub metrics: Arc<MetricsRegistry>,
    pub health: Arc<HealthState>,
}

/// Build the router for all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cron/update-prices", get(update_prices).post(update_prices))
        .route("/api/prices", get(latest_prices))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the router on `bind_address` until shutdown.
#[instrument(skip(state, shutdown_rx))]
pub async fn serve(
    bind_address: String,
    state: AppState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    Ok(())
}

/// Run the orchestrator and publish the snapshot.
pub async fn update_prices(State(state): State<AppState>) -> Response {
    match state.refresh.refresh().await {
        Ok(count) => (StatusCode::OK, Json(json!({ "success": true, "count": count }))).into_response(),
        Err(e @ RefreshError::EmptySnapshot) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e @ RefreshError::Publish(_)) => {
            error!(error = %e, "Refresh failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Last assembled snapshot, served from memory.
pub async fn latest_prices(State(state): State<AppState>) -> Response {
    Json(state.refresh.orchestrator().get_all().await).into_response()
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
