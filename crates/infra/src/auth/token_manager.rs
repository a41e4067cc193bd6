//! Token manager
//!
//! One instance serves both systems. Reads are lock-free against the store;
//! logins hold a per-system mutex so concurrent callers perform exactly one
//! login, with a double-check after acquiring in case another task finished
//! first. Login failures are never retried here.

use std::sync::Arc;

use syncbridge_common::time::{Clock, SystemClock};
use syncbridge_core::{AuthApi, CredentialsProvider, TokenStore};
use syncbridge_domain::{ExternalSystem, Result, SyncError, Token};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct TokenManager {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    credentials: Arc<dyn CredentialsProvider>,
    clock: Arc<dyn Clock>,
    erp_login: Mutex<()>,
    crm_login: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        credentials: Arc<dyn CredentialsProvider>,
    ) -> Self {
        Self::with_clock(auth, store, credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        credentials: Arc<dyn CredentialsProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { auth, store, credentials, clock, erp_login: Mutex::new(()), crm_login: Mutex::new(()) }
    }

    /// Valid token for `system`, logging in if none is stored or the stored
    /// one has expired.
    pub async fn get_token(&self, system: ExternalSystem) -> Result<Token> {
        if let Some(token) = self.store.get(system).await? {
            if !token.is_expired(self.clock.now()) {
                return Ok(token);
            }
            debug!(system = %system, "stored token expired");
        }

        let _guard = self.login_lock(system).lock().await;

        // Another caller may have logged in while we waited for the lock
        if let Some(token) = self.store.get(system).await? {
            if !token.is_expired(self.clock.now()) {
                return Ok(token);
            }
        }

        let credentials = self.credentials.credentials(system)?;
        let token = self.auth.login(system, &credentials).await?;
        self.store.put(token.clone()).await?;
        info!(system = %system, expires_at = %token.expires_at, "logged in to external system");
        Ok(token)
    }

    /// Stored token for `system` without refreshing, expired or not.
    pub async fn current_token(&self, system: ExternalSystem) -> Result<Option<Token>> {
        self.store.get(system).await
    }

    /// Drop the stored token; the next `get_token` re-authenticates.
    pub async fn invalidate(&self, system: ExternalSystem) -> Result<()> {
        debug!(system = %system, "invalidating stored token");
        self.store.clear(system).await
    }

    /// Log out of `system` remotely and clear the stored token.
    ///
    /// A remote rejection with `Unauthorized` means the session is already
    /// gone upstream and counts as success. The stored token is cleared in
    /// every branch, including when the remote call fails.
    pub async fn logout(&self, system: ExternalSystem) -> Result<()> {
        let remote = match self.store.get(system).await? {
            Some(token) => match self.auth.logout(system, &token).await {
                Err(SyncError::Unauthorized(_)) => {
                    debug!(system = %system, "remote session already terminated");
                    Ok(())
                }
                other => other,
            },
            None => Ok(()),
        };

        self.store.clear(system).await?;
        if remote.is_ok() {
            info!(system = %system, "logged out of external system");
        }
        remote
    }

    fn login_lock(&self, system: ExternalSystem) -> &Mutex<()> {
        match system {
            ExternalSystem::Erp => &self.erp_login,
            ExternalSystem::Crm => &self.crm_login,
        }
    }
}
