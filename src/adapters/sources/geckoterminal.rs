//! GeckoTerminal Pool Source - Secondary Quote Provider
//!
//! Queries the GeckoTerminal pool endpoint. A pool carries prices for
//! both of its tokens; the pool name ("BASE / QUOTE") decides which side
//! belongs to the requested symbol, defaulting to the base token.
//! Valuation is not taken from this source.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::client::{parse_number, HttpQuoteClient};
use crate::domain::price::NormalizedQuote;
use crate::ports::quote_source::{QuoteError, QuoteSource};

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.geckoterminal.com/api/v2";

const NAME: &str = "geckoterminal";

#[derive(Debug, Deserialize)]
struct PoolResponse {
    data: Option<PoolData>,
}

#[derive(Debug, Deserialize)]
struct PoolData {
    attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
    name: Option<String>,
    base_token_price_usd: Option<serde_json::Value>,
    quote_token_price_usd: Option<serde_json::Value>,
    price_change_percentage: Option<PriceChange>,
}

#[derive(Debug, Deserialize)]
struct PriceChange {
    h24: Option<serde_json::Value>,
}

/// GeckoTerminal quote source.
pub struct GeckoTerminalSource {
    client: Arc<HttpQuoteClient>,
    base_url: String,
}

impl GeckoTerminalSource {
    /// Create a GeckoTerminal source sharing `client`.
    pub fn new(client: Arc<HttpQuoteClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn pool_url(&self, network: &str, pool_address: &str) -> String {
        format!("{}/networks/{network}/pools/{pool_address}", self.base_url)
    }
}

#[async_trait]
impl QuoteSource for GeckoTerminalSource {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self), fields(source = NAME))]
    async fn fetch_quote(
        &self,
        network: &str,
        pool_address: &str,
        symbol: &str,
    ) -> Result<Option<NormalizedQuote>, QuoteError> {
        let url = self.pool_url(network, pool_address);
        let response = self.client.get_json::<PoolResponse>(NAME, &url).await?;
        Ok(response.and_then(|r| select_quote(r, symbol)))
    }
}

/// Which side of the pool the symbol sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolSide {
    Base,
    Quote,
}

fn side_for_symbol(pool_name: Option<&str>, symbol: &str) -> PoolSide {
    let Some((base, quote)) = pool_name.and_then(|n| n.split_once('/')) else {
        return PoolSide::Base;
    };
    let symbol = symbol.trim();
    let quote = quote.split_whitespace().next().unwrap_or_default();
    if !base.trim().eq_ignore_ascii_case(symbol) && quote.eq_ignore_ascii_case(symbol) {
        PoolSide::Quote
    } else {
        PoolSide::Base
    }
}

fn select_quote(response: PoolResponse, symbol: &str) -> Option<NormalizedQuote> {
    let attrs = response.data?.attributes;
    let price = match side_for_symbol(attrs.name.as_deref(), symbol) {
        PoolSide::Base => attrs.base_token_price_usd.as_ref(),
        PoolSide::Quote => attrs.quote_token_price_usd.as_ref(),
    };

    let quote = NormalizedQuote {
        price_usd: parse_number(price),
        percent_change: parse_number(attrs.price_change_percentage.as_ref().and_then(|c| c.h24.as_ref())),
        fully_diluted_value: None,
    };

    quote.usable_price().map(|_| quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PoolResponse {
        serde_json::from_str(body).unwrap()
    }

    const BODY: &str = r#"{
        "data": {
            "id": "base_0xabc",
            "type": "pool",
            "attributes": {
                "name": "FOO / VIRTUAL",
                "address": "0xabc",
                "base_token_price_usd": "0.0125",
                "quote_token_price_usd": "1.84",
                "fdv_usd": "12500000",
                "price_change_percentage": { "m5": "0", "h1": "-1.2", "h24": "-20.5" }
            }
        }
    }"#;

    #[test]
    fn test_base_side_by_default() {
        let quote = select_quote(parse(BODY), "FOO").unwrap();
        assert_eq!(quote.price_usd, Some(0.0125));
        assert_eq!(quote.percent_change, Some(-20.5));
        assert_eq!(quote.fully_diluted_value, None);
    }

    #[test]
    fn test_quote_side_when_symbol_matches() {
        let quote = select_quote(parse(BODY), "virtual").unwrap();
        assert_eq!(quote.price_usd, Some(1.84));
    }

    #[test]
    fn test_pool_name_with_fee_tier() {
        assert_eq!(side_for_symbol(Some("WETH / VIRTUAL 0.3%"), "VIRTUAL"), PoolSide::Quote);
        assert_eq!(side_for_symbol(Some("VIRTUAL / WETH 1%"), "VIRTUAL"), PoolSide::Base);
        assert_eq!(side_for_symbol(None, "VIRTUAL"), PoolSide::Base);
    }

    #[test]
    fn test_missing_data_is_no_data() {
        assert!(select_quote(parse(r#"{ "data": null }"#), "FOO").is_none());
        let unpriced = r#"{ "data": { "attributes": { "name": "FOO / BAR" } } }"#;
        assert!(select_quote(parse(unpriced), "FOO").is_none());
    }
}
