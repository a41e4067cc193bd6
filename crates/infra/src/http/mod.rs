//! HTTP transport

mod client;

pub use client::{classify_status, error_for_status, ResilientClient, ResilientClientBuilder};
