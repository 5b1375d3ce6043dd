//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `QuoteSource`: Pool price providers (DexScreener, GeckoTerminal)
//! - `PriceCache`: Published snapshot storage

pub mod price_cache;
pub mod quote_source;

pub use price_cache::PriceCache;
pub use quote_source::{QuoteError, QuoteOutcome, QuoteSource};
