//! Synchronization ports
//!
//! Trait seams between the pure core and the impure infra crate.

pub mod ports;
