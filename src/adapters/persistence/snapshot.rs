//! Snapshot Store - Atomic JSON Price Cache
//!
//! Saves the published price snapshot to `<key>.json` using atomic
//! writes (write to tmp file, then rename). Readers always see either
//! the previous or the new snapshot, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::price::PriceRecord;
use crate::ports::price_cache::PriceCache;

/// Key downstream consumers read the shared snapshot from.
pub const DEFAULT_CACHE_KEY: &str = "GLOBAL_PRICE_CACHE";

/// File-backed price cache, one JSON array per key.
pub struct SnapshotStore {
    /// Directory holding the snapshot files.
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a new store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Final path of the snapshot stored under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

#[async_trait]
impl PriceCache for SnapshotStore {
    /// Save a snapshot atomically (tmp → rename).
    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn store(&self, key: &str, records: &[PriceRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)
            .context("Failed to serialize snapshot")?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp snapshot file")?;

        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename snapshot file")?;

        info!(path = %path.display(), "Price snapshot saved");

        Ok(())
    }

    /// Load the snapshot for `key`; `None` before the first publish.
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<Vec<PriceRecord>>> {
        let path = self.path_for(key);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .context("Failed to read snapshot file")?;

        let records: Vec<PriceRecord> =
            serde_json::from_str(&json).context("Failed to parse snapshot JSON")?;

        Ok(Some(records))
    }

    async fn is_healthy(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
