//! Domain layer - Core pricing logic and models.
//!
//! Pure types and functions: tokens and their routing keys, provider
//! quotes, published price records, baseline reconstruction and
//! cross-rate conversion. No I/O here (hexagonal architecture inner ring).

pub mod baseline;
pub mod price;
pub mod token;

// Re-export core types for convenience
pub use baseline::{baseline_or_live, derive_baseline};
pub use price::{Denomination, NormalizedQuote, PriceRecord, SourceRole};
pub use token::{PoolRef, Token};
