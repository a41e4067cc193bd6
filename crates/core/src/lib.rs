//! # SyncBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The transformation engine (fixed schema mappers + declarative field
//!   mapper)
//! - The webhook dispatcher state machine and signature verification
//! - Port/adapter interfaces (traits) for everything impure
//!
//! ## Architecture Principles
//! - Only depends on `syncbridge-common` and `syncbridge-domain`
//! - No HTTP, storage, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;
pub mod transform;
pub mod webhook;

// Re-export specific items to avoid ambiguity
pub use sync::ports::{AuthApi, CredentialsProvider, SyncWriter, TokenStore, WriteMethod};
pub use transform::TransformationEngine;
pub use webhook::{BatchReport, DispatchOutcome, WebhookDispatcher, WebhookSecrets};
