//! Quote and published price record types.
//!
//! `NormalizedQuote` is what a provider adapter hands back; `PriceRecord`
//! is the per-token entry of the published snapshot. The serialized field
//! names of `PriceRecord` are the cache wire format read by downstream
//! consumers (`pLive`, `p0`, ...), so they must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::baseline::baseline_or_live;
use super::token::{PoolRef, Token};

/// Provider-agnostic quote for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    /// Current price as reported by the provider.
    pub price_usd: Option<f64>,
    /// Percent move over the provider's reporting window.
    pub percent_change: Option<f64>,
    /// Fully diluted valuation.
    pub fully_diluted_value: Option<f64>,
}

impl NormalizedQuote {
    /// The price, if it is finite and strictly positive.
    pub fn usable_price(&self) -> Option<f64> {
        self.price_usd.filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// Position of the answering adapter in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    Primary,
    Secondary,
}

impl SourceRole {
    /// Role of the adapter at `rank` in the chain (0 = primary).
    pub fn from_rank(rank: usize) -> Self {
        if rank == 0 { Self::Primary } else { Self::Secondary }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency the prices of a record are expressed in.
///
/// `Reference` only appears when the reference token could not be priced
/// during a run: the pool quotes are then published unconverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Usd,
    Reference,
}

/// One token's entry in the published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub token_id: String,
    pub symbol: String,
    /// Current price.
    #[serde(rename = "pLive")]
    pub live_price: f64,
    /// Reconstructed price at the start of the reporting window.
    #[serde(rename = "p0")]
    pub baseline_price: f64,
    #[serde(rename = "changePct")]
    pub percent_change: f64,
    #[serde(rename = "fdv")]
    pub fully_diluted_value: f64,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// Which slot of the fallback chain answered.
    #[serde(rename = "source")]
    pub source_name: SourceRole,
    /// Adapter that answered (e.g. "dexscreener").
    pub provider: String,
    #[serde(rename = "dexUrl")]
    pub display_url: String,
    pub denomination: Denomination,
}

impl PriceRecord {
    /// Builds a USD record candidate from a usable quote.
    ///
    /// Returns `None` when the quote carries no usable price. Only the
    /// primary slot contributes a fully diluted value; secondary records
    /// always carry 0.
    pub fn from_quote(
        token: &Token,
        pool: &PoolRef<'_>,
        role: SourceRole,
        provider: &str,
        quote: &NormalizedQuote,
    ) -> Option<Self> {
        let live_price = quote.usable_price()?;
        let fully_diluted_value = match role {
            SourceRole::Primary => quote.fully_diluted_value.filter(|v| v.is_finite()).unwrap_or(0.0),
            SourceRole::Secondary => 0.0,
        };

        Some(Self {
            token_id: token.id.clone(),
            symbol: token.symbol.clone(),
            live_price,
            baseline_price: baseline_or_live(live_price, quote.percent_change),
            percent_change: quote.percent_change.filter(|c| c.is_finite()).unwrap_or(0.0),
            fully_diluted_value,
            timestamp: Utc::now(),
            source_name: role,
            provider: provider.to_string(),
            display_url: pool.display_url(),
            denomination: Denomination::Usd,
        })
    }

    /// Converts a reference-denominated record into USD.
    ///
    /// With `rate <= 0` (reference unresolved) the values are left as-is and
    /// the record is marked [`Denomination::Reference`].
    pub fn with_cross_rate(mut self, rate: f64) -> Self {
        if rate > 0.0 {
            self.live_price *= rate;
            self.baseline_price *= rate;
            self.fully_diluted_value *= rate;
            self.denomination = Denomination::Usd;
        } else {
            self.denomination = Denomination::Reference;
        }
        self
    }
}
