//! Resilience primitives
//!
//! Pure building blocks for the outbound retry loop:
//! - [`retry::RetryDecision`] and the [`retry::RetryPolicy`] trait — failure
//!   classification, independent of any scheduling primitive
//! - [`retry::Backoff`] — exponential backoff calculation
//!
//! The loop that actually sleeps and re-issues requests lives with the HTTP
//! client in the infra crate; this module never suspends.

pub mod retry;

pub use retry::{Backoff, RetryDecision, RetryPolicy};
