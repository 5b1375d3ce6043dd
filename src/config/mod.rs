//! Configuration Module - TOML-based Oracle Configuration
//!
//! Loads and validates configuration from `config.toml`. Provider
//! endpoints, timeouts, registry location and the reference token are
//! all externalized here; the domain layer only sees plain values.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::persistence::DEFAULT_CACHE_KEY;
use crate::adapters::sources::{dexscreener, geckoterminal};
use crate::domain::token::DEFAULT_REFERENCE_ID;

/// Environment variable overriding `reference.token_id`.
pub const REFERENCE_ENV: &str = "VIRTUAL_TOKEN_ID";

/// Top-level oracle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and HTTP surface.
  pub service: ServiceConfig,
  /// Cross-rate anchor.
  #[serde(default)]
  pub reference: ReferenceConfig,
  /// Quote provider endpoints and timeouts.
  #[serde(default)]
  pub providers: ProvidersConfig,
  /// Token list location.
  pub registry: RegistryConfig,
  /// Snapshot cache.
  #[serde(default)]
  pub cache: CacheConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// HTTP bind address.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
  /// Self-triggered refresh period. 0 leaves refreshes to the cron endpoint.
  #[serde(default)]
  pub refresh_interval_seconds: u64,
}

/// Reference token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
  /// Id or symbol of the reference token, matched case-insensitively.
  #[serde(default = "default_reference_id")]
  pub token_id: String,
}

impl Default for ReferenceConfig {
  fn default() -> Self {
    Self {
      token_id: default_reference_id(),
    }
  }
}

/// Quote provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
  /// DexScreener API base URL (primary).
  #[serde(default = "default_dexscreener_url")]
  pub dexscreener_url: String,
  /// GeckoTerminal API base URL (secondary).
  #[serde(default = "default_geckoterminal_url")]
  pub geckoterminal_url: String,
  /// Transport timeout of a single HTTP request.
  #[serde(default = "default_request_timeout")]
  pub request_timeout_ms: u64,
  /// Upper bound on one adapter call, enforced by the orchestrator.
  #[serde(default = "default_fetch_timeout")]
  pub fetch_timeout_ms: u64,
  /// Maximum in-flight provider requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
}

impl ProvidersConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_millis(self.fetch_timeout_ms)
  }
}

impl Default for ProvidersConfig {
  fn default() -> Self {
    Self {
      dexscreener_url: default_dexscreener_url(),
      geckoterminal_url: default_geckoterminal_url(),
      request_timeout_ms: default_request_timeout(),
      fetch_timeout_ms: default_fetch_timeout(),
      max_concurrent: default_max_concurrent(),
    }
  }
}

/// Token registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
  /// Path to the JSON token list.
  pub token_list_path: String,
  /// Key holding the rows when the list is an object.
  #[serde(default = "default_sheet")]
  pub sheet: String,
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Directory holding snapshot files.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  /// Key the snapshot is published under.
  #[serde(default = "default_cache_key")]
  pub key: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      key: default_cache_key(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_reference_id() -> String {
  DEFAULT_REFERENCE_ID.to_string()
}

fn default_dexscreener_url() -> String {
  dexscreener::DEFAULT_BASE_URL.to_string()
}

fn default_geckoterminal_url() -> String {
  geckoterminal::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
  10_000
}

fn default_fetch_timeout() -> u64 {
  15_000
}

fn default_max_concurrent() -> usize {
  8
}

fn default_sheet() -> String {
  "Sayfa1".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_cache_key() -> String {
  DEFAULT_CACHE_KEY.to_string()
}
