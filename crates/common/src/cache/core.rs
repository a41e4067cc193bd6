//! moka-backed TTL cache
//!
//! Generic key/value store used for read-through caching of fetched
//! entities. Values are JSON documents; every entry carries its own TTL so
//! callers can cache different endpoints with different lifetimes.
//!
//! Prefix invalidation is supported through moka's invalidation closures so
//! administrators (and the webhook path) can drop all entries for one
//! entity type without enumerating keys.

use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use serde_json::Value;
use thiserror::Error;

/// Default TTL for cache entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of entries.
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Prefix invalidation predicate was rejected by the backing store
    #[error("Cache invalidation failed: {0}")]
    Invalidation(String),
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct TtlCacheConfig {
    /// TTL applied when an insert does not specify one
    pub default_ttl: Duration,

    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        Self { default_ttl: DEFAULT_TTL, max_capacity: DEFAULT_MAX_CAPACITY }
    }
}

impl TtlCacheConfig {
    /// Create config with custom TTL (useful for testing)
    #[must_use]
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self { default_ttl, max_capacity: DEFAULT_MAX_CAPACITY }
    }
}

/// One stored value together with its TTL.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    ttl: Duration,
}

/// Per-entry expiry policy: each entry lives for the TTL recorded at insert
/// time.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// TTL-bounded key/value cache for upstream entity data.
///
/// Writes happen only after a successful upstream fetch, and an insert is
/// atomic from the reader's perspective — entries are never partially
/// written. Concurrent misses for the same key may both fetch upstream;
/// the last writer wins, which is acceptable under TTL-bounded staleness.
pub struct TtlCache {
    entries: Cache<String, CacheEntry>,
    config: TtlCacheConfig,
}

impl TtlCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: TtlCacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryTtl)
            .support_invalidation_closures()
            .build();

        Self { entries, config }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        let hit = self.entries.get(key).map(|entry| entry.value);
        if hit.is_some() {
            tracing::debug!(key, "cache hit");
        } else {
            tracing::debug!(key, "cache miss");
        }
        hit
    }

    /// Insert a value with the default TTL.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value with an explicit TTL.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        tracing::trace!(key = %key, ttl_secs = ttl.as_secs(), "cache store");
        self.entries.insert(key, CacheEntry { value, ttl });
    }

    /// Invalidate one entry by key.
    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(key);
        tracing::debug!(key, "cache invalidated");
    }

    /// Invalidate every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let owned = prefix.to_string();
        self.entries
            .invalidate_entries_if(move |key, _| key.starts_with(&owned))
            .map_err(|e| CacheError::Invalidation(e.to_string()))?;
        tracing::debug!(prefix, "cache prefix invalidated");
        Ok(())
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        tracing::info!("cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        // Run pending tasks to get accurate counts
        self.entries.run_pending_tasks();
        CacheStats { entry_count: self.entries.entry_count() }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of live entries
    pub entry_count: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn returns_inserted_value_until_invalidated() {
        let cache = TtlCache::new(TtlCacheConfig::default());

        cache.insert("erp:customers?id=1", json!({"name": "Acme"}));
        assert_eq!(cache.get("erp:customers?id=1"), Some(json!({"name": "Acme"})));

        cache.invalidate("erp:customers?id=1");
        assert_eq!(cache.get("erp:customers?id=1"), None);
    }

    #[test]
    fn missing_key_is_a_miss() {
        let cache = TtlCache::new(TtlCacheConfig::default());
        assert_eq!(cache.get("nothing"), None);
    }

    #[test]
    fn entries_expire_after_their_own_ttl() {
        let cache = TtlCache::new(TtlCacheConfig::default());

        cache.insert_with_ttl("short", json!(1), Duration::from_millis(20));
        cache.insert_with_ttl("long", json!(2), Duration::from_secs(60));
        assert_eq!(cache.get("short"), Some(json!(1)));

        std::thread::sleep(Duration::from_millis(50));
        cache.stats(); // flush pending eviction work

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(json!(2)));
    }

    #[test]
    fn prefix_invalidation_only_touches_matching_keys() {
        let cache = TtlCache::new(TtlCacheConfig::default());

        cache.insert("crm:accounts?id=1", json!(1));
        cache.insert("crm:accounts?id=2", json!(2));
        cache.insert("crm:opportunities?id=1", json!(3));

        cache.invalidate_prefix("crm:accounts").unwrap();
        cache.stats();

        assert_eq!(cache.get("crm:accounts?id=1"), None);
        assert_eq!(cache.get("crm:accounts?id=2"), None);
        assert_eq!(cache.get("crm:opportunities?id=1"), Some(json!(3)));
    }

    #[test]
    fn clear_removes_everything() {
        let cache = TtlCache::new(TtlCacheConfig::default());

        cache.insert("a", json!(1));
        cache.insert("b", json!(2));
        assert_eq!(cache.stats().entry_count, 2);

        cache.clear();
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn last_writer_wins_on_same_key() {
        let cache = TtlCache::new(TtlCacheConfig::default());

        cache.insert("k", json!("first"));
        cache.insert("k", json!("second"));

        assert_eq!(cache.get("k"), Some(json!("second")));
    }
}
