//! Token Registry Adapter - Static Token List Loading
//!
//! Loads the fixed set of quotable tokens from a JSON token list once at
//! startup. The registry is immutable afterwards.

pub mod token_list;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::token::Token;

pub use token_list::{row_to_token, seed_tokens, tokens_from_document};

/// Errors loading the token list.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The token list file could not be read.
    #[error("failed to read token list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The token list is not valid JSON.
    #[error("token list {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the registry from the token list at `path`.
///
/// Rows are read from the sheet named `sheet`. Seed tokens are appended
/// when the list lacks them, so the result is never empty.
pub fn load_registry(path: impl AsRef<Path>, sheet: &str) -> Result<Vec<Token>, RegistryError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let tokens = tokens_from_document(&document, sheet);
    let quotable = tokens.iter().filter(|t| t.pool_ref().is_some()).count();
    if quotable < tokens.len() {
        warn!(
            unquotable = tokens.len() - quotable,
            "Tokens without a pool address will never be priced"
        );
    }

    info!(
        path = %path.display(),
        tokens = tokens.len(),
        quotable,
        "Token registry loaded"
    );

    Ok(tokens)
}
