use once_cell::sync::Lazy;
use regex::Regex;

static UNIT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i) unit ").expect("unit token pattern is valid"));

/// A raw address split into the building part and an optional unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressParts {
    pub base: String,
    pub unit: Option<String>,
}

/// Splits `address` on the first case-insensitive `" unit "` token.
///
/// Only whitespace is trimmed; case and punctuation are left untouched.
pub fn parse(address: &str) -> AddressParts {
    match UNIT_TOKEN.find(address) {
        Some(token) => AddressParts {
            base: address[..token.start()].trim().to_string(),
            unit: Some(address[token.end()..].trim().to_string()),
        },
        None => AddressParts {
            base: address.trim().to_string(),
            unit: None,
        },
    }
}

/// Lowercases and collapses runs of whitespace to a single space.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
