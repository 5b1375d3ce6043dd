//! Quote Source Port - Market Data Provider Interface
//!
//! Defines the trait every price provider adapter implements, the error
//! type they fail with, and the three-way outcome the orchestrator acts on.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::price::NormalizedQuote;

/// Failure of a single provider request.
///
/// Never fatal: the orchestrator logs it and moves on to the next source.
#[derive(Debug, Clone, Error)]
pub enum QuoteError {
  /// Transport-level failure (connect, TLS, body read).
  #[error("{provider}: request failed: {message}")]
  Http { provider: String, message: String },
  /// The provider answered with an unexpected HTTP status.
  #[error("{provider}: unexpected status {status}")]
  Status { provider: String, status: u16 },
  /// The response body could not be decoded.
  #[error("{provider}: invalid response: {message}")]
  Decode { provider: String, message: String },
  /// The call did not settle within the per-fetch timeout.
  #[error("{provider}: no answer within {after_ms}ms")]
  Timeout { provider: String, after_ms: u64 },
}

/// Trait for pool price providers.
///
/// Implementors return `Ok(None)` when the provider has no data for the
/// pool; errors are reserved for transport and decoding failures.
///
/// Whatever an adapter returns as `price_usd` (and `fully_diluted_value`)
/// is taken as denominated in the reference token for every token except
/// the reference itself, and is multiplied by the reference's USD price.
/// The bundled adapters pass their provider's USD price field through
/// unchanged, so non-reference prices are scaled by the reference price.
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
  /// Provider name used in logs, metrics and the `provider` record field.
  fn name(&self) -> &'static str;

  /// Quote the pool `pool_address` on `network`.
  ///
  /// `symbol` lets providers that list both sides of a pool pick the
  /// token's side.
  async fn fetch_quote(
    &self,
    network: &str,
    pool_address: &str,
    symbol: &str,
  ) -> Result<Option<NormalizedQuote>, QuoteError>;
}

/// Result of asking one source for one token.
#[derive(Debug, Clone)]
pub enum QuoteOutcome {
  /// A quote with a usable price.
  Quote(NormalizedQuote),
  /// The provider answered but had nothing usable.
  NoData,
  /// The provider failed; treated like `NoData` for control flow.
  Failed(QuoteError),
}

impl From<Result<Option<NormalizedQuote>, QuoteError>> for QuoteOutcome {
  fn from(result: Result<Option<NormalizedQuote>, QuoteError>) -> Self {
    match result {
      Ok(Some(quote)) if quote.usable_price().is_some() => Self::Quote(quote),
      Ok(_) => Self::NoData,
      Err(e) => Self::Failed(e),
    }
  }
}
