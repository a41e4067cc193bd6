//! Port interfaces for external-system access
//!
//! Implementations live in `syncbridge-infra`; tests use in-crate mocks.

use async_trait::async_trait;
use serde_json::Value;
use syncbridge_domain::{Credentials, ExternalSystem, Result, Token};

/// HTTP method for upstream writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Post,
    Put,
}

impl WriteMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// Durable, TTL-bounded storage of the current token per external system.
///
/// Any durable keyed store works; the engine ships in-memory and JSON-file
/// implementations. At most one token per system is stored.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token for `system`, expired or not. Expiry is the token
    /// manager's concern.
    async fn get(&self, system: ExternalSystem) -> Result<Option<Token>>;

    /// Replace the stored token for the token's system.
    async fn put(&self, token: Token) -> Result<()>;

    /// Remove the stored token for `system`.
    async fn clear(&self, system: ExternalSystem) -> Result<()>;
}

/// Supplies per-system credentials, injected at startup.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self, system: ExternalSystem) -> Result<Credentials>;
}

/// Login/logout operations against one system's auth endpoint.
///
/// `login` failures surface as `SyncError::AuthenticationFailure` and are
/// never retried here or in the token manager; callers decide. A remote
/// `logout` rejected with 403 surfaces as `SyncError::Unauthorized`, which
/// the token manager treats as "already logged out".
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, system: ExternalSystem, credentials: &Credentials) -> Result<Token>;

    async fn logout(&self, system: ExternalSystem, token: &Token) -> Result<()>;
}

/// Authenticated write path used by the webhook dispatcher.
///
/// Implemented by the fetch gateway. Writes always bypass the read cache;
/// invalidation is a separate, explicit operation.
#[async_trait]
pub trait SyncWriter: Send + Sync {
    async fn write(
        &self,
        system: ExternalSystem,
        endpoint: &str,
        data: Value,
        method: WriteMethod,
    ) -> Result<Value>;

    /// Invalidate every cache entry whose key starts with `prefix`.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<()>;
}
