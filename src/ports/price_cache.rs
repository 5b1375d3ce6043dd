//! Price Cache Port - Snapshot Publication Interface
//!
//! The shared cache downstream consumers read the latest price snapshot
//! from. Writes replace the whole snapshot under a key.

use async_trait::async_trait;

use crate::domain::price::PriceRecord;

/// Trait for snapshot stores.
#[async_trait]
pub trait PriceCache: Send + Sync + 'static {
  /// Replace the snapshot stored under `key`.
  async fn store(&self, key: &str, records: &[PriceRecord]) -> anyhow::Result<()>;

  /// Load the snapshot stored under `key`, if any.
  async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<PriceRecord>>>;

  /// Check if the store is usable (directory present, permissions).
  async fn is_healthy(&self) -> bool;
}
