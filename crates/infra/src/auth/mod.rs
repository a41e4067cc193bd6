//! Token lifecycle management
//!
//! `TokenManager` owns per-system tokens end to end: single-flight login,
//! expiry checks, invalidation and logout. Tokens persist through a
//! `TokenStore` implementation so restarts do not force a re-login.

mod credentials;
mod http_api;
mod stores;
mod token_manager;

pub use credentials::StaticCredentialsProvider;
pub use http_api::HttpAuthApi;
pub use stores::{FileTokenStore, MemoryTokenStore};
pub use token_manager::TokenManager;
