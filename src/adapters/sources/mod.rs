//! Quote Source Adapters - Pool Price Providers
//!
//! HTTP adapters implementing the `QuoteSource` port:
//! - DexScreener: primary pool quotes (price, 24h change, FDV)
//! - GeckoTerminal: secondary pool quotes (price, 24h change)
//! - Client: shared concurrency-bounded JSON client

pub mod client;
pub mod dexscreener;
pub mod geckoterminal;

pub use client::{HttpClientConfig, HttpQuoteClient};
pub use dexscreener::DexScreenerSource;
pub use geckoterminal::GeckoTerminalSource;
