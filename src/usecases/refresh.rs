//! Refresh - Run the Orchestrator and Publish the Snapshot
//!
//! Triggered by the cron endpoint (or the optional interval timer).
//! An empty run means every provider failed; publishing it would wipe
//! the last good snapshot downstream, so it is rejected instead.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::ports::price_cache::PriceCache;

use super::price_orchestrator::PriceOrchestrator;

/// Why a refresh did not publish.
#[derive(Debug, Error)]
pub enum RefreshError {
  /// The run produced no records; the cache was left untouched.
  #[error("No prices fetched, skipping update.")]
  EmptySnapshot,
  /// Writing the snapshot to the cache failed.
  #[error("failed to publish snapshot: {0}")]
  Publish(#[source] anyhow::Error),
}

/// Runs the orchestrator and publishes non-empty snapshots.
pub struct RefreshService {
  /// Price orchestrator.
  orchestrator: Arc<PriceOrchestrator>,
  /// Shared snapshot cache.
  cache: Arc<dyn PriceCache>,
  /// Key the snapshot is published under.
  cache_key: String,
  /// Prometheus metrics.
  metrics: Arc<MetricsRegistry>,
}

impl RefreshService {
  /// Create a new refresh service.
  pub fn new(
    orchestrator: Arc<PriceOrchestrator>,
    cache: Arc<dyn PriceCache>,
    cache_key: &str,
    metrics: Arc<MetricsRegistry>,
  ) -> Self {
    Self {
      orchestrator,
      cache,
      cache_key: cache_key.to_string(),
      metrics,
    }
  }

  /// The orchestrator this service drives.
  pub fn orchestrator(&self) -> &Arc<PriceOrchestrator> {
    &self.orchestrator
  }

  /// Seed the in-memory snapshot from the last published one.
  ///
  /// Returns the number of restored records (0 before the first publish).
  #[instrument(skip(self), fields(key = %self.cache_key))]
  pub async fn restore(&self) -> anyhow::Result<usize> {
    let Some(records) = self.cache.load(&self.cache_key).await? else {
      info!("No published snapshot to restore");
      return Ok(0);
    };

    let count = records.len();
    self.orchestrator.restore(records).await;
    info!(count, "Restored last published snapshot");

    Ok(count)
  }

  /// Fetch all prices and publish them.
  ///
  /// Returns the number of published records.
  #[instrument(skip(self), fields(key = %self.cache_key))]
  pub async fn refresh(&self) -> Result<usize, RefreshError> {
    let records = self.orchestrator.run().await;

    if records.is_empty() {
      warn!("Run produced no prices, keeping previous snapshot");
      self.metrics.refreshes.with_label_values(&["empty"]).inc();
      return Err(RefreshError::EmptySnapshot);
    }

    if let Err(e) = self.cache.store(&self.cache_key, &records).await {
      error!(error = %e, "Failed to publish snapshot");
      self.metrics.refreshes.with_label_values(&["error"]).inc();
      return Err(RefreshError::Publish(e));
    }

    self.metrics.refreshes.with_label_values(&["published"]).inc();
    info!(count = records.len(), "Snapshot published");

    Ok(records.len())
  }
}
