//! Persistence Adapters - File-based Snapshot Cache
//!
//! Implements the PriceCache port with atomic JSON snapshot files.
//! One file per key, replaced by rename.

pub mod snapshot;

pub use snapshot::{SnapshotStore, DEFAULT_CACHE_KEY};
