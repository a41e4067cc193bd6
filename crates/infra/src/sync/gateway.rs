//! Cache-aside fetch gateway
//!
//! Single entry point for all outbound reads and writes. Reads go through
//! the TTL cache; a hit returns without touching the token manager or the
//! network. Misses authenticate, call upstream through the resilient
//! client, normalize the body into the typed envelope and cache non-empty
//! data. Writes always bypass the cache and never invalidate it implicitly;
//! invalidation is its own operation.
//!
//! A 401 from upstream means the token went stale server-side: the gateway
//! invalidates it, re-authenticates and retries exactly once. Two
//! concurrent misses on one key may both hit upstream; the last writer
//! wins, which is acceptable under TTL-bounded staleness.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use syncbridge_common::cache::{derive_cache_key, TtlCache};
use syncbridge_core::{SyncWriter, WriteMethod};
use syncbridge_domain::{ApiEnvelope, ExternalSystem, Result, SyncError, UpstreamEnvelope};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::TokenManager;
use crate::http::ResilientClient;

pub struct FetchGateway {
    tokens: Arc<TokenManager>,
    client: ResilientClient,
    cache: TtlCache,
    erp_base_url: String,
    crm_base_url: String,
}

impl FetchGateway {
    pub fn new(
        tokens: Arc<TokenManager>,
        client: ResilientClient,
        cache: TtlCache,
        erp_base_url: impl Into<String>,
        crm_base_url: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            client,
            cache,
            erp_base_url: erp_base_url.into(),
            crm_base_url: crm_base_url.into(),
        }
    }

    /// Cached read against `system`.
    ///
    /// The effective cache key is `cache_key` when given, otherwise derived
    /// from `(system, endpoint, params)`. A 404 propagates as `NotFound`
    /// and never populates the cache; neither does an empty (`null`) body.
    pub async fn fetch(
        &self,
        system: ExternalSystem,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        cache_key: Option<&str>,
    ) -> Result<ApiEnvelope> {
        let key = cache_key
            .map_or_else(|| derive_cache_key(system.as_str(), endpoint, params), str::to_owned);

        if let Some(data) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(ApiEnvelope::ok(true, data));
        }

        debug!(%key, "cache miss, fetching upstream");
        let url = self.url(system, endpoint);
        let response = self
            .authed_send(system, || {
                self.client.request(Method::GET, &url).query(params)
            })
            .await?;

        let envelope = parse_envelope(response).await?;
        if !envelope.is_empty() {
            self.cache.insert(key, envelope.data.clone());
        }
        Ok(ApiEnvelope::ok(false, envelope.data))
    }

    /// Uncached write against `system`. Returns the normalized response
    /// data. Related cache entries stay as they are; callers invalidate
    /// explicitly when they need to.
    pub async fn write(
        &self,
        system: ExternalSystem,
        endpoint: &str,
        data: &Value,
        method: WriteMethod,
    ) -> Result<Value> {
        let url = self.url(system, endpoint);
        let http_method = match method {
            WriteMethod::Post => Method::POST,
            WriteMethod::Put => Method::PUT,
        };
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, system = %system, endpoint, method = %http_method, "outbound write");

        let response = self
            .authed_send(system, || {
                self.client.request(http_method.clone(), &url).json(data)
            })
            .await?;

        let envelope = parse_envelope(response).await?;
        debug!(%correlation_id, "outbound write completed");
        Ok(envelope.data)
    }

    /// Drop one cache entry.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Drop every cache entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<()> {
        self.cache
            .invalidate_prefix(prefix)
            .map_err(|e| SyncError::Internal(format!("cache invalidation failed: {e}")))
    }

    /// Authenticate and send, retrying once with a fresh token when
    /// upstream rejects the current one.
    async fn authed_send<F>(&self, system: ExternalSystem, make_request: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.tokens.get_token(system).await?;
        match self.client.send(make_request().bearer_auth(&token.value)).await {
            Err(SyncError::AuthenticationFailure(reason)) => {
                warn!(system = %system, %reason, "upstream rejected token, re-authenticating");
                self.tokens.invalidate(system).await?;
                let fresh = self.tokens.get_token(system).await?;
                self.client.send(make_request().bearer_auth(&fresh.value)).await
            }
            other => other,
        }
    }

    fn url(&self, system: ExternalSystem, endpoint: &str) -> String {
        let base = match system {
            ExternalSystem::Erp => &self.erp_base_url,
            ExternalSystem::Crm => &self.crm_base_url,
        };
        format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
    }
}

async fn parse_envelope(response: Response) -> Result<UpstreamEnvelope> {
    let body: Value = response
        .json()
        .await
        .map_err(|e| SyncError::Serialization(format!("malformed upstream response: {e}")))?;
    let envelope = UpstreamEnvelope::from_value(body)?;

    // A producer can report failure inside a 200 body; that is still a
    // failure and must never reach the cache.
    if envelope.status != "ok" {
        warn!(status = %envelope.status, "upstream envelope reported a non-ok status");
        return Err(SyncError::Internal(format!(
            "upstream reported status '{}'",
            envelope.status
        )));
    }
    Ok(envelope)
}

#[async_trait]
impl SyncWriter for FetchGateway {
    async fn write(
        &self,
        system: ExternalSystem,
        endpoint: &str,
        data: Value,
        method: WriteMethod,
    ) -> Result<Value> {
        Self::write(self, system, endpoint, &data, method).await
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<()> {
        Self::invalidate_prefix(self, prefix)
    }
}
