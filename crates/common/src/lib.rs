//! # SyncBridge Common
//!
//! Reusable infrastructure primitives with no domain knowledge.
//!
//! This crate contains:
//! - [`time`]: clock abstractions (real and mock time for testing)
//! - [`cache`]: TTL key/value cache with deterministic key derivation and
//!   prefix invalidation
//! - [`resilience`]: pure retry classification and backoff calculation
//!
//! ## Architecture
//! - No dependencies on other SyncBridge crates
//! - Each module defines its own error types

pub mod cache;
pub mod resilience;
pub mod time;
