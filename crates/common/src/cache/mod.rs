//! TTL key/value caching
//!
//! Read-through cache support for fetched upstream entities:
//! - **[`core`]**: `TtlCache`, a moka-backed store with per-entry TTL,
//!   single-key invalidation and prefix invalidation
//! - **[`keys`]**: deterministic cache-key derivation from
//!   (system, endpoint, normalized params)
//!
//! Entries are only ever written after a successful upstream fetch; the
//! cache itself never talks to the network.

pub mod core;
pub mod keys;

pub use self::core::{CacheError, CacheStats, TtlCache, TtlCacheConfig};
pub use keys::derive_cache_key;
