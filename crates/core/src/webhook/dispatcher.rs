//! Webhook dispatcher
//!
//! Runs each inbound event through `Received -> Verified -> Mapped ->
//! Applied`. A bad signature rejects at Verified (`Unauthorized`, logged
//! with the source address); malformed events reject with
//! `ValidationFailure`; downstream write errors fail at Applied. Unknown
//! event types are ignored, not errors, so new upstream event vocabulary
//! never breaks ingestion.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use syncbridge_domain::{
    Result, SyncDirection, SyncError, WebhookEvent, WebhookEventType, CRM_ACTIVE_FLAG,
    ERP_ACTIVE_FLAG,
};
use tracing::{info, warn};

use crate::sync::ports::{SyncWriter, WriteMethod};
use crate::transform::TransformationEngine;
use crate::webhook::signature;

/// Shared secrets for verifying inbound signatures, one per source system.
#[derive(Debug, Clone)]
pub struct WebhookSecrets {
    pub erp: String,
    pub crm: String,
}

impl WebhookSecrets {
    fn for_system(&self, system: syncbridge_domain::ExternalSystem) -> &str {
        match system {
            syncbridge_domain::ExternalSystem::Erp => &self.erp,
            syncbridge_domain::ExternalSystem::Crm => &self.crm,
        }
    }
}

/// Terminal result of dispatching one event. This is the caller-facing
/// report; raw error traces stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Event reached Applied: the counterpart write succeeded.
    Applied { entity_type: String, endpoint: String },
    /// Unrecognized event type, skipped without error.
    Ignored { event_type: String },
    /// Rejected at Verified or by validation, before any write.
    Rejected { reason: String },
    /// Write to the counterpart system failed.
    Failed { reason: String },
}

/// Per-event outcomes and aggregate counts for a batch of events.
///
/// Each event is processed independently; one failure never aborts the
/// batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<DispatchOutcome>,
    pub applied: usize,
    pub ignored: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: DispatchOutcome) {
        match &outcome {
            DispatchOutcome::Applied { .. } => self.applied += 1,
            DispatchOutcome::Ignored { .. } => self.ignored += 1,
            DispatchOutcome::Rejected { .. } => self.rejected += 1,
            DispatchOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

pub struct WebhookDispatcher<W: SyncWriter> {
    engine: TransformationEngine,
    writer: Arc<W>,
    secrets: WebhookSecrets,
}

impl<W: SyncWriter> WebhookDispatcher<W> {
    pub fn new(writer: Arc<W>, secrets: WebhookSecrets) -> Self {
        Self { engine: TransformationEngine::new(), writer, secrets }
    }

    /// Full pipeline for a raw HTTP delivery: verify the signature, parse
    /// the body, then dispatch.
    pub async fn handle_raw(
        &self,
        source: syncbridge_domain::ExternalSystem,
        body: &str,
        timestamp: &str,
        presented_signature: &str,
        source_addr: &str,
    ) -> Result<DispatchOutcome> {
        let secret = self.secrets.for_system(source);
        if !signature::verify(secret, timestamp, body, presented_signature) {
            warn!(system = %source, source_addr, "webhook signature verification failed");
            return Err(SyncError::Unauthorized(format!(
                "invalid webhook signature from {source_addr}"
            )));
        }

        let event: WebhookEvent = serde_json::from_str(body)
            .map_err(|e| SyncError::ValidationFailure(format!("malformed webhook body: {e}")))?;

        self.handle(source, &event).await
    }

    /// Dispatch one already-verified event.
    ///
    /// Validation failures and bad signatures surface as errors so single-
    /// event callers can map them to client-error responses; use
    /// [`handle_batch`](Self::handle_batch) for report-style handling.
    pub async fn handle(
        &self,
        source: syncbridge_domain::ExternalSystem,
        event: &WebhookEvent,
    ) -> Result<DispatchOutcome> {
        let direction = SyncDirection::from_source(source);

        match &event.event_type {
            WebhookEventType::Created => self.apply_create(direction, event).await,
            WebhookEventType::Updated => self.apply_update(direction, event).await,
            WebhookEventType::Deleted => self.apply_delete(direction, event).await,
            WebhookEventType::Other(name) => {
                warn!(event_type = %name, entity_type = %event.entity_type, "ignoring unrecognized webhook event type");
                Ok(DispatchOutcome::Ignored { event_type: name.clone() })
            }
        }
    }

    /// Process a batch of events independently.
    pub async fn handle_batch(
        &self,
        source: syncbridge_domain::ExternalSystem,
        events: &[WebhookEvent],
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for event in events {
            let outcome = match self.handle(source, event).await {
                Ok(outcome) => outcome,
                Err(err @ (SyncError::ValidationFailure(_) | SyncError::Unauthorized(_))) => {
                    DispatchOutcome::Rejected { reason: err.to_string() }
                }
                Err(err) => DispatchOutcome::Failed { reason: err.to_string() },
            };
            report.record(outcome);
        }
        report
    }

    async fn apply_create(
        &self,
        direction: SyncDirection,
        event: &WebhookEvent,
    ) -> Result<DispatchOutcome> {
        let payload = required_payload(event)?;
        let mapped = self.engine.map(&event.entity_type, direction, payload)?;
        let endpoint = self.engine.target_endpoint(&event.entity_type, direction)?;

        self.apply_write(direction, &event.entity_type, endpoint.to_owned(), mapped, WriteMethod::Post)
            .await
    }

    async fn apply_update(
        &self,
        direction: SyncDirection,
        event: &WebhookEvent,
    ) -> Result<DispatchOutcome> {
        let external_id = required_external_id(event)?;
        let payload = required_payload(event)?;
        let mapped = self.engine.map(&event.entity_type, direction, payload)?;
        let endpoint = self.engine.target_endpoint(&event.entity_type, direction)?;

        self.apply_write(
            direction,
            &event.entity_type,
            format!("{endpoint}/{external_id}"),
            mapped,
            WriteMethod::Put,
        )
        .await
    }

    /// Deletions are soft: the counterpart record is deactivated via its
    /// active flag, never removed. The payload is still mandatory, like on
    /// every other event; only the id drives the write.
    async fn apply_delete(
        &self,
        direction: SyncDirection,
        event: &WebhookEvent,
    ) -> Result<DispatchOutcome> {
        let external_id = required_external_id(event)?;
        required_payload(event)?;
        let endpoint = self.engine.target_endpoint(&event.entity_type, direction)?;
        let flag = match direction.target() {
            syncbridge_domain::ExternalSystem::Erp => ERP_ACTIVE_FLAG,
            syncbridge_domain::ExternalSystem::Crm => CRM_ACTIVE_FLAG,
        };

        self.apply_write(
            direction,
            &event.entity_type,
            format!("{endpoint}/{external_id}"),
            json!({ flag: false }),
            WriteMethod::Put,
        )
        .await
    }

    async fn apply_write(
        &self,
        direction: SyncDirection,
        entity_type: &str,
        endpoint: String,
        data: Value,
        method: WriteMethod,
    ) -> Result<DispatchOutcome> {
        let target = direction.target();
        match self.writer.write(target, &endpoint, data, method).await {
            Ok(_) => {
                // Collection prefix, so list and detail entries both drop
                let base = endpoint.split('/').next().unwrap_or(&endpoint);
                let prefix = format!("{target}:{base}");
                if let Err(err) = self.writer.invalidate_prefix(&prefix).await {
                    warn!(%prefix, error = %err, "cache invalidation after webhook write failed");
                }
                info!(system = %target, %endpoint, method = method.as_str(), "webhook event applied");
                Ok(DispatchOutcome::Applied { entity_type: entity_type.to_owned(), endpoint })
            }
            Err(err) => Err(err),
        }
    }
}

fn required_payload(event: &WebhookEvent) -> Result<&Value> {
    match &event.payload {
        Some(payload) if !payload.is_null() => Ok(payload),
        _ => Err(SyncError::ValidationFailure(format!(
            "webhook event for '{}' is missing a payload",
            event.entity_type
        ))),
    }
}

fn required_external_id(event: &WebhookEvent) -> Result<&str> {
    match event.external_id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SyncError::ValidationFailure(format!(
            "webhook event for '{}' requires an entity id",
            event.entity_type
        ))),
    }
}
