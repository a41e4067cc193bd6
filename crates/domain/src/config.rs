//! Configuration structures
//!
//! Loading (environment variables, file fallback) lives in the infra crate;
//! the domain crate only defines the shapes.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::types::Credentials;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBridgeConfig {
    pub erp: SystemConfig,
    pub crm: SystemConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Connection settings for one external system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Base URL of the system's API, without trailing slash.
    pub base_url: String,
    pub credentials: Credentials,
    /// Shared secret used to verify inbound webhook signatures.
    pub webhook_secret: String,
}

/// Read-through cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: DEFAULT_CACHE_TTL_SECS, max_capacity: DEFAULT_CACHE_MAX_CAPACITY }
    }
}

/// Outbound retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts (initial try + retries).
    pub max_attempts: u32,
    /// Base unit for exponential backoff, in milliseconds.
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, backoff_base_ms: DEFAULT_BACKOFF_BASE_MS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_sections_missing() {
        let toml = r#"
            [erp]
            base_url = "https://erp.example.com/api/v1"
            webhook_secret = "erp-secret"
            [erp.credentials]
            username = "sync"
            password = "pw"
            app_key = "key-1"

            [crm]
            base_url = "https://crm.example.com/services"
            webhook_secret = "crm-secret"
            [crm.credentials]
            username = "integration"
            password = "pw"
            app_key = "key-2"
        "#;

        let config: SyncBridgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.ttl_seconds, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(config.retry.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.erp.credentials.username, "sync");
    }
}
