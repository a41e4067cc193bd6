//! Synchronization infrastructure

mod gateway;

pub use gateway::FetchGateway;
