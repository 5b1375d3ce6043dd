//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, applying the environment override for
//! the reference token, and validating every parameter with clear error
//! messages.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use super::{AppConfig, REFERENCE_ENV};

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config, std::env::var(REFERENCE_ENV).ok());
  validate_config(&config)?;

  info!(
    service = %config.service.name,
    reference = %config.reference.token_id,
    registry = %config.registry.token_list_path,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse a TOML document without touching the environment.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}

/// Apply `VIRTUAL_TOKEN_ID` when set and non-blank.
fn apply_env_overrides(config: &mut AppConfig, reference: Option<String>) {
  if let Some(id) = reference.filter(|v| !v.trim().is_empty()) {
    config.reference.token_id = id;
  }
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.trim().is_empty(),
    "service.name must not be empty"
  );
  anyhow::ensure!(
    config.service.bind_address.parse::<std::net::SocketAddr>().is_ok(),
    "service.bind_address is not a socket address: {}",
    config.service.bind_address
  );

  for (key, raw) in [
    ("providers.dexscreener_url", &config.providers.dexscreener_url),
    ("providers.geckoterminal_url", &config.providers.geckoterminal_url),
  ] {
    Url::parse(raw).with_context(|| format!("{key} is not a valid URL: {raw}"))?;
  }

  anyhow::ensure!(
    config.providers.request_timeout_ms > 0,
    "providers.request_timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.providers.fetch_timeout_ms > 0,
    "providers.fetch_timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.providers.max_concurrent > 0,
    "providers.max_concurrent must be positive"
  );

  anyhow::ensure!(
    !config.registry.token_list_path.trim().is_empty(),
    "registry.token_list_path must not be empty"
  );
  anyhow::ensure!(
    !config.cache.key.trim().is_empty(),
    "cache.key must not be empty"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    [service]
    name = "virtual-price-oracle"

    [registry]
    token_list_path = "data/token-list.json"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_takes_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.service.bind_address, "0.0.0.0:8080");
    assert_eq!(config.service.refresh_interval_seconds, 0);
    assert_eq!(config.reference.token_id, "virtual");
    assert_eq!(config.providers.request_timeout_ms, 10_000);
    assert_eq!(config.providers.fetch_timeout_ms, 15_000);
    assert_eq!(config.providers.max_concurrent, 8);
    assert_eq!(config.registry.sheet, "Sayfa1");
    assert_eq!(config.cache.data_dir, "data");
    assert_eq!(config.cache.key, "GLOBAL_PRICE_CACHE");
  }

  #[test]
  fn test_env_override_replaces_reference() {
    let mut config = parse_config(MINIMAL).unwrap();
    apply_env_overrides(&mut config, Some("AIXBT".to_string()));
    assert_eq!(config.reference.token_id, "AIXBT");

    apply_env_overrides(&mut config, Some("   ".to_string()));
    assert_eq!(config.reference.token_id, "AIXBT");
  }

  #[test]
  fn test_rejects_zero_fetch_timeout() {
    let toml = format!("{MINIMAL}\n[providers]\nfetch_timeout_ms = 0\n");
    let config = parse_config(&toml).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_bad_provider_url() {
    let toml = format!("{MINIMAL}\n[providers]\ndexscreener_url = \"not a url\"\n");
    let config = parse_config(&toml).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_missing_registry_is_parse_error() {
    assert!(parse_config("[service]\nname = \"x\"\n").is_err());
  }
}
