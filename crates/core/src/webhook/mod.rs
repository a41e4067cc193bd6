//! Inbound webhook handling
//!
//! [`signature`] authenticates raw requests; [`dispatcher`] runs the
//! `Received -> Verified -> Mapped -> Applied` pipeline that turns a change
//! event on one system into an authenticated write on the other.

pub mod dispatcher;
pub mod signature;

pub use dispatcher::{BatchReport, DispatchOutcome, WebhookDispatcher, WebhookSecrets};
