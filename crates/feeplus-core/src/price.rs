//! Decimal price strings as the Admin API accepts them.

use std::sync::OnceLock;

use regex::Regex;

const FALLBACK_PRICE: &str = "0.00";

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("static price pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("Price is empty")]
    Empty,
    #[error("Price `{0}` is not a non-negative amount with at most two decimals")]
    Invalid(String),
}

/// Strict form of [`normalize_price`].
///
/// Trims, treats the first comma as the decimal separator and appends
/// `.00` to whole amounts.
pub fn parse_price(raw: &str) -> Result<String, PriceError> {
    let candidate = raw.trim().replacen(',', ".", 1);
    if candidate.is_empty() {
        return Err(PriceError::Empty);
    }
    if !price_pattern().is_match(&candidate) {
        return Err(PriceError::Invalid(raw.trim().to_string()));
    }
    if candidate.contains('.') {
        Ok(candidate)
    } else {
        Ok(format!("{candidate}.00"))
    }
}

/// Normalizes a user-entered price, falling back to `0.00` when invalid.
///
/// Idempotent: normalizing an already normalized price returns it unchanged.
pub fn normalize_price(raw: &str) -> String {
    match parse_price(raw) {
        Ok(price) => price,
        Err(err) => {
            tracing::warn!(input = %raw, error = %err, "Price not usable, using {FALLBACK_PRICE}");
            FALLBACK_PRICE.to_string()
        }
    }
}
