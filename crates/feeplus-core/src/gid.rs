//! Global id helpers.

const VARIANT_PREFIX: &str = "gid://shopify/ProductVariant/";

/// Accepts a numeric variant id or a variant GID and returns the GID.
///
/// ```
/// use feeplus_core::gid::normalize_variant_gid;
///
/// assert_eq!(
///     normalize_variant_gid(" 4711 ").as_deref(),
///     Some("gid://shopify/ProductVariant/4711")
/// );
/// assert_eq!(normalize_variant_gid("gid://shopify/Product/1"), None);
/// ```
pub fn normalize_variant_gid(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if is_numeric(raw) {
        return Some(format!("{VARIANT_PREFIX}{raw}"));
    }
    raw.strip_prefix(VARIANT_PREFIX)
        .filter(|id| is_numeric(id))
        .map(|_| raw.to_string())
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
