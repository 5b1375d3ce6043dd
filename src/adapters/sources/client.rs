//! Provider HTTP Client - Bounded JSON Fetcher
//!
//! Wraps reqwest with a request timeout and a connection pool shared by
//! all quote providers. Exactly one attempt per call; the caller bounds
//! how many calls are in flight.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ports::quote_source::QuoteError;

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Idle connections kept per provider host.
    pub max_concurrent: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrent: 8,
        }
    }
}

/// JSON client for the quote providers.
pub struct HttpQuoteClient {
    /// Underlying HTTP client.
    http: Client,
}

impl HttpQuoteClient {
    /// Create a new provider client.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_concurrent)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// A 404 means the provider does not know the pool and maps to
    /// `Ok(None)`; any other non-success status is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
    ) -> Result<Option<T>, QuoteError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| QuoteError::Http {
                provider: provider.to_string(),
                message: e.to_string(),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(provider, url, "Pool unknown to provider");
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.bytes().await.map_err(|e| QuoteError::Http {
                    provider: provider.to_string(),
                    message: e.to_string(),
                })?;
                serde_json::from_slice(&body)
                    .map(Some)
                    .map_err(|e| QuoteError::Decode {
                        provider: provider.to_string(),
                        message: e.to_string(),
                    })
            }
            status => Err(QuoteError::Status {
                provider: provider.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Parse a numeric field that providers may send as a string or a number.
pub(crate) fn parse_number(value: Option<&serde_json::Value>) -> Option<f64> {
    let number = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
