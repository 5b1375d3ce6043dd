//! Token List Parser - Spreadsheet Export to Registry Tokens
//!
//! The token list is a JSON export of a spreadsheet: rows keyed by column
//! header, optionally wrapped in an object keyed by sheet name. Column
//! headers from the sheet and plain field names are both accepted.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use url::Url;

use crate::domain::token::{Token, DEFAULT_NETWORK};

/// First EVM address anywhere in a string.
static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]{40}").expect("address pattern is valid"));

const NAME_COLUMNS: &[&str] = &["CARD NAME / TOKEN NAME", "name"];
const SYMBOL_COLUMNS: &[&str] = &["TICKER", "symbol"];
const POOL_COLUMNS: &[&str] = &["GECKO TERMINAL POOL LINK", "dexscreenerPair"];

/// Tokens always present in the registry, appended when the list lacks them.
pub fn seed_tokens() -> Vec<Token> {
    vec![Token {
        id: "virtual".to_string(),
        symbol: "VIRTUAL".to_string(),
        name: "Virtual Protocol".to_string(),
        network: DEFAULT_NETWORK.to_string(),
        pool_address: Some("0x0b3e328455c4059eeb9e3743215830db5a980191".to_string()),
    }]
}

/// Build the registry from a parsed token list document.
///
/// Rows are read from `document[sheet]` when the document is an object,
/// or from the document itself when it is an array. Tokens are keyed by
/// id: a later duplicate replaces an earlier one in the earlier position.
pub fn tokens_from_document(document: &Value, sheet: &str) -> Vec<Token> {
    let rows = match document {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(sheets) => sheets
            .get(sheet)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    let mut registry: IndexMap<String, Token> = IndexMap::with_capacity(rows.len() + 1);
    for row in rows.iter().filter_map(Value::as_object) {
        let token = row_to_token(row);
        registry.insert(token.id.clone(), token);
    }

    for seed in seed_tokens() {
        if !registry.contains_key(&seed.id) {
            registry.insert(seed.id.clone(), seed);
        }
    }

    registry.into_values().collect()
}

/// Convert one sheet row into a token.
pub fn row_to_token(row: &Map<String, Value>) -> Token {
    let name = column(row, NAME_COLUMNS).trim().to_string();
    let symbol = column(row, SYMBOL_COLUMNS)
        .replace('$', "")
        .trim()
        .to_uppercase();
    let link = column(row, POOL_COLUMNS).trim().to_string();

    let id = [symbol.as_str(), name.as_str()]
        .into_iter()
        .map(sanitize_id)
        .find(|id| !id.is_empty())
        .unwrap_or_else(|| "token".to_string());

    Token {
        symbol: if symbol.is_empty() { id.to_uppercase() } else { symbol },
        network: network_from_link(&link).unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
        pool_address: clean_address(&link),
        name,
        id,
    }
}

/// First non-empty value among `columns`, stringified.
fn column(row: &Map<String, Value>, columns: &[&str]) -> String {
    columns
        .iter()
        .filter_map(|c| row.get(*c))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Lowercase ticker with leading `$` and anything outside `[a-z0-9]` removed.
pub fn sanitize_id(input: &str) -> String {
    input
        .to_lowercase()
        .trim_start_matches('$')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// First `0x` address in `input`, lowercased.
pub fn clean_address(input: &str) -> Option<String> {
    ADDRESS.find(input).map(|m| m.as_str().to_lowercase())
}

/// Network segment of a DexScreener / GeckoTerminal pool link.
///
/// Both sites put the chain first in the path (`/base/0x...`,
/// `/base/pools/0x...`).
pub fn network_from_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let network = segments.next()?;
    segments.next()?;
    (!network.starts_with("0x")).then(|| network.to_lowercase())
}
