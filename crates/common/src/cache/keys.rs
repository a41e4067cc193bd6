//! Deterministic cache-key derivation
//!
//! Keys are a pure function of (system, endpoint, normalized params) so that
//! identical requests always map to the same entry regardless of parameter
//! order at the call site.

use std::collections::BTreeMap;

/// Derive the cache key for a request.
///
/// Params are normalized by sorting on name (BTreeMap iteration order) and
/// percent-encoding both names and values. The resulting shape is
/// `system:endpoint` or `system:endpoint?a=1&b=2`, which also makes
/// `system:endpoint` a usable invalidation prefix for every parameter
/// variant of one endpoint.
#[must_use]
pub fn derive_cache_key(system: &str, endpoint: &str, params: &BTreeMap<String, String>) -> String {
    let endpoint = endpoint.trim_matches('/');
    if params.is_empty() {
        return format!("{system}:{endpoint}");
    }

    let query: Vec<String> = params
        .iter()
        .map(|(name, value)| {
            format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
        })
        .collect();

    format!("{system}:{endpoint}?{}", query.join("&"))
}
