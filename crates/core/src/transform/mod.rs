//! Bidirectional entity transformation
//!
//! Two complementary capabilities:
//! - [`engine`]: fixed schema mappers, one pure function per
//!   (entity type, direction) pair, plus the status/stage vocabulary tables
//! - [`mapper`]: declarative dot-path field mapping for ad-hoc mappings
//!
//! Both are total: missing source fields become documented defaults, never
//! errors and never absent output fields.

pub mod engine;
pub mod mapper;

pub use engine::TransformationEngine;
pub use mapper::{apply_rules, apply_set, resolve_path};
