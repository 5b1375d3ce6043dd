//! DexScreener Pair Source - Primary Quote Provider
//!
//! Queries the DexScreener pairs endpoint for a single pool and accepts
//! only the pair whose address matches the requested pool. DexScreener
//! search results may contain neighbouring pairs; those are ignored.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::client::{parse_number, HttpQuoteClient};
use crate::domain::price::NormalizedQuote;
use crate::ports::quote_source::{QuoteError, QuoteSource};

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";

const NAME: &str = "dexscreener";

/// Pairs endpoint response.
#[derive(Debug, Deserialize)]
struct PairsResponse {
    pairs: Option<Vec<Pair>>,
    pair: Option<Pair>,
}

/// A single DexScreener pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    pair_address: String,
    /// USD price, sent as a string.
    price_usd: Option<serde_json::Value>,
    price_change: Option<PriceChange>,
    fdv: Option<serde_json::Value>,
}

/// Windowed percent changes.
#[derive(Debug, Deserialize)]
struct PriceChange {
    h24: Option<serde_json::Value>,
}

/// DexScreener quote source.
pub struct DexScreenerSource {
    client: Arc<HttpQuoteClient>,
    base_url: String,
}

impl DexScreenerSource {
    /// Create a DexScreener source sharing `client`.
    pub fn new(client: Arc<HttpQuoteClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn pair_url(&self, network: &str, pool_address: &str) -> String {
        format!("{}/latest/dex/pairs/{network}/{pool_address}", self.base_url)
    }
}

#[async_trait]
impl QuoteSource for DexScreenerSource {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self, _symbol), fields(source = NAME))]
    async fn fetch_quote(
        &self,
        network: &str,
        pool_address: &str,
        _symbol: &str,
    ) -> Result<Option<NormalizedQuote>, QuoteError> {
        let url = self.pair_url(network, pool_address);
        let Some(response) = self.client.get_json::<PairsResponse>(NAME, &url).await? else {
            return Ok(None);
        };

        let quote = select_quote(response, pool_address);
        if quote.is_none() {
            debug!("No matching pair in response");
        }
        Ok(quote)
    }
}

/// Pick the pair matching `pool_address` and normalize it.
fn select_quote(response: PairsResponse, pool_address: &str) -> Option<NormalizedQuote> {
    let pair = response
        .pairs
        .into_iter()
        .flatten()
        .chain(response.pair)
        .find(|p| p.pair_address.eq_ignore_ascii_case(pool_address))?;

    let quote = NormalizedQuote {
        price_usd: parse_number(pair.price_usd.as_ref()),
        percent_change: parse_number(pair.price_change.as_ref().and_then(|c| c.h24.as_ref())),
        fully_diluted_value: parse_number(pair.fdv.as_ref()),
    };

    quote.usable_price().map(|_| quote)
}
