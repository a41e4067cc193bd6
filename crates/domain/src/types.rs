//! Common data types used throughout the application

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, SyncError};

/// The two external systems being synchronized.
///
/// The core treats both sides symmetrically: either one can be the source of
/// a fetch, a write, or a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalSystem {
    /// On-premises ERP system
    Erp,
    /// External CRM
    Crm,
}

impl ExternalSystem {
    /// The system on the other side of the sync.
    #[must_use]
    pub fn counterpart(self) -> Self {
        match self {
            Self::Erp => Self::Crm,
            Self::Crm => Self::Erp,
        }
    }

    /// Stable identifier used in cache keys and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Erp => "erp",
            Self::Crm => "crm",
        }
    }
}

impl std::fmt::Display for ExternalSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a transformation or webhook-driven write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    ErpToCrm,
    CrmToErp,
}

impl SyncDirection {
    /// Direction for events originating in `source`.
    #[must_use]
    pub fn from_source(source: ExternalSystem) -> Self {
        match source {
            ExternalSystem::Erp => Self::ErpToCrm,
            ExternalSystem::Crm => Self::CrmToErp,
        }
    }

    #[must_use]
    pub fn source(self) -> ExternalSystem {
        match self {
            Self::ErpToCrm => ExternalSystem::Erp,
            Self::CrmToErp => ExternalSystem::Crm,
        }
    }

    #[must_use]
    pub fn target(self) -> ExternalSystem {
        self.source().counterpart()
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ErpToCrm => "erp_to_crm",
            Self::CrmToErp => "crm_to_erp",
        })
    }
}

/// Access token for one external system.
///
/// Owned exclusively by the token manager and persisted through the
/// `TokenStore` port so it survives process restarts. Expiry is checked at
/// use time, never only on a timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub system: ExternalSystem,
}

impl Token {
    /// Create a token valid for `ttl_seconds` from `issued_at`.
    #[must_use]
    pub fn new(
        value: String,
        system: ExternalSystem,
        issued_at: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self { value, issued_at, expires_at: issued_at + Duration::seconds(ttl_seconds), system }
    }

    /// Whether the token is expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Seconds remaining until expiry as of `now` (negative when expired).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

/// Username/password/app-key credentials for one external system.
///
/// Injected at startup by the configuration loader; the core never reads
/// credentials from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub app_key: String,
}

/// Kind of an inbound webhook change event.
///
/// Unknown kinds deserialize into `Other` so that new event types added
/// upstream are ignored instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEventType {
    Created,
    Updated,
    Deleted,
    #[serde(untagged)]
    Other(String),
}

/// An inbound change event from one external system.
///
/// Created at ingress, consumed synchronously by the dispatcher, never
/// persisted beyond the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(rename = "entityId", default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Pagination metadata an upstream system may attach to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(rename = "pageSize", default)]
    pub page_size: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// The single typed envelope all upstream producers must conform to.
///
/// Producers that return a bare JSON body (no envelope) are normalized at the
/// boundary instead of sniffed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamEnvelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: Value,
}

impl UpstreamEnvelope {
    /// Normalize an upstream response body into the typed envelope.
    ///
    /// Objects carrying both `status` and `data` are taken as already
    /// enveloped; any other JSON body is wrapped as `{status: "ok", data}`.
    /// An enveloped body with a malformed `pagination` block is rejected.
    pub fn from_value(body: Value) -> Result<Self> {
        let looks_enveloped = body
            .as_object()
            .is_some_and(|obj| obj.contains_key("status") && obj.contains_key("data"));

        if looks_enveloped {
            serde_json::from_value(body)
                .map_err(|e| SyncError::Serialization(format!("malformed upstream envelope: {e}")))
        } else {
            Ok(Self { status: "ok".to_string(), pagination: None, data: body })
        }
    }

    /// Whether the envelope carries no usable data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_null()
    }
}

/// Response body route handlers forward to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    pub cached: bool,
    pub data: Value,
}

impl ApiEnvelope {
    #[must_use]
    pub fn ok(cached: bool, data: Value) -> Self {
        Self { status: "ok".to_string(), cached, data }
    }
}

/// One declarative field-to-field mapping rule.
///
/// `source_field` is a dot-path into the source entity; resolution
/// short-circuits to `default_value` (or null) on any missing intermediate
/// segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRule {
    pub source_field: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl MappingRule {
    #[must_use]
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self { source_field: source_field.into(), target_field: target_field.into(), default_value: None }
    }

    #[must_use]
    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

/// Ordered collection of mapping rules for one entity-type pair and
/// direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSet {
    pub source_entity_type: String,
    pub target_entity_type: String,
    pub direction: SyncDirection,
    pub rules: Vec<MappingRule>,
}
