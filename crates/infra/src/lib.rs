//! # SyncBridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The resilient HTTP client (retry + backoff over reqwest)
//! - Token lifecycle management and token stores
//! - The cache-aside fetch gateway
//! - Configuration loading
//! - The `SyncEngine` context object wiring everything together
//!
//! ## Architecture
//! - Implements traits defined in `syncbridge-core`
//! - Depends on `syncbridge-common`, `syncbridge-domain` and
//!   `syncbridge-core`
//! - Contains all "impure" code (I/O, HTTP, filesystem)

pub mod auth;
pub mod config;
pub mod engine;
pub mod errors;
pub mod http;
pub mod sync;

// Re-export commonly used items
pub use auth::{FileTokenStore, HttpAuthApi, MemoryTokenStore, StaticCredentialsProvider, TokenManager};
pub use engine::SyncEngine;
pub use http::{ResilientClient, ResilientClientBuilder};
pub use sync::FetchGateway;
