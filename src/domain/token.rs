//! Token registry entries and their provider routing keys.

use serde::{Deserialize, Serialize};

/// Network assumed when a token list row carries no usable pool link.
pub const DEFAULT_NETWORK: &str = "base";

/// Reference token identifier used when none is configured.
pub const DEFAULT_REFERENCE_ID: &str = "virtual";

/// Canonical external link for a pool (DexScreener URL convention).
pub const DISPLAY_URL_BASE: &str = "https://dexscreener.com";

/// A quotable token loaded from the registry at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique, normalized ticker (e.g. "virtual").
    pub id: String,
    /// Display ticker, uppercase (e.g. "VIRTUAL").
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
    /// Chain identifier understood by both quote providers.
    pub network: String,
    /// Liquidity pool the token is quoted in, lowercase `0x` address.
    pub pool_address: Option<String>,
}

impl Token {
    /// Routing key for the quote providers.
    ///
    /// `None` when the token has no (or a blank) pool address; such tokens
    /// are never quoted.
    pub fn pool_ref(&self) -> Option<PoolRef<'_>> {
        let pool_address = self.pool_address.as_deref()?.trim();
        if pool_address.is_empty() {
            return None;
        }
        Some(PoolRef {
            network: &self.network,
            pool_address,
            symbol: &self.symbol,
        })
    }

    /// Whether this token is the reference token named by `reference_id`.
    ///
    /// Matches on id or symbol, case-insensitive and ignoring surrounding
    /// whitespace on both sides.
    pub fn matches_reference(&self, reference_id: &str) -> bool {
        let wanted = reference_id.trim();
        !wanted.is_empty()
            && (self.id.trim().eq_ignore_ascii_case(wanted)
                || self.symbol.trim().eq_ignore_ascii_case(wanted))
    }
}

/// Borrowed provider routing key of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRef<'a> {
    pub network: &'a str,
    pub pool_address: &'a str,
    pub symbol: &'a str,
}

impl PoolRef<'_> {
    /// Public link to the pool, independent of which provider answered.
    pub fn display_url(&self) -> String {
        format!("{DISPLAY_URL_BASE}/{}/{}", self.network, self.pool_address)
    }
}

/// Normalizes a configured reference identifier (trimmed, lowercase).
pub fn normalize_reference_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_REFERENCE_ID.to_string()
    } else {
        trimmed.to_lowercase()
    }
}
