//! SyncBridge engine
//!
//! The context object owning every long-lived component: token manager,
//! resilient client, cache, fetch gateway, transformation engine and
//! webhook dispatcher. Constructed once from configuration and passed
//! around by `Arc`; there is no global mutable state.

use std::sync::Arc;
use std::time::Duration;

use syncbridge_common::cache::{TtlCache, TtlCacheConfig};
use syncbridge_core::{TokenStore, TransformationEngine, WebhookDispatcher, WebhookSecrets};
use syncbridge_domain::{Result, SyncBridgeConfig};

use crate::auth::{HttpAuthApi, MemoryTokenStore, StaticCredentialsProvider, TokenManager};
use crate::http::ResilientClient;
use crate::sync::FetchGateway;

pub struct SyncEngine {
    config: SyncBridgeConfig,
    tokens: Arc<TokenManager>,
    gateway: Arc<FetchGateway>,
    transformer: TransformationEngine,
    dispatcher: WebhookDispatcher<FetchGateway>,
}

impl SyncEngine {
    /// Build the full component graph with an in-memory token store.
    pub fn from_config(config: SyncBridgeConfig) -> Result<Arc<Self>> {
        Self::with_token_store(config, Arc::new(MemoryTokenStore::new()))
    }

    /// Build the full component graph with a caller-provided token store
    /// (e.g. a `FileTokenStore` so tokens survive restarts).
    pub fn with_token_store(
        config: SyncBridgeConfig,
        store: Arc<dyn TokenStore>,
    ) -> Result<Arc<Self>> {
        let client = ResilientClient::builder()
            .max_attempts(config.retry.max_attempts)
            .base_backoff(Duration::from_millis(config.retry.backoff_base_ms))
            .build()?;

        let auth = Arc::new(HttpAuthApi::new(
            client.clone(),
            config.erp.base_url.clone(),
            config.crm.base_url.clone(),
        ));
        let credentials = Arc::new(StaticCredentialsProvider::from_config(&config));
        let tokens = Arc::new(TokenManager::new(auth, store, credentials));

        let cache = TtlCache::new(TtlCacheConfig {
            default_ttl: Duration::from_secs(config.cache.ttl_seconds),
            max_capacity: config.cache.max_capacity,
        });
        let gateway = Arc::new(FetchGateway::new(
            Arc::clone(&tokens),
            client,
            cache,
            config.erp.base_url.clone(),
            config.crm.base_url.clone(),
        ));

        let secrets = WebhookSecrets {
            erp: config.erp.webhook_secret.clone(),
            crm: config.crm.webhook_secret.clone(),
        };
        let dispatcher = WebhookDispatcher::new(Arc::clone(&gateway), secrets);

        Ok(Arc::new(Self {
            config,
            tokens,
            gateway,
            transformer: TransformationEngine::new(),
            dispatcher,
        }))
    }

    pub fn config(&self) -> &SyncBridgeConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn gateway(&self) -> &Arc<FetchGateway> {
        &self.gateway
    }

    pub fn transformer(&self) -> &TransformationEngine {
        &self.transformer
    }

    pub fn dispatcher(&self) -> &WebhookDispatcher<FetchGateway> {
        &self.dispatcher
    }
}
