//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Token lifecycle
/// Conservative default token lifetime when the login response carries no
/// explicit expiry.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

// Cache configuration
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

// Retry configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

// Entity types known to the fixed-schema transformation engine
pub const ENTITY_CUSTOMER: &str = "customer";
pub const ENTITY_ACCOUNT: &str = "account";
pub const ENTITY_SALES_ORDER: &str = "salesOrder";
pub const ENTITY_OPPORTUNITY: &str = "opportunity";

// Soft-deactivation flags (the CRM has no delete semantics for synced
// records, so "deleted" events clear these instead)
pub const ERP_ACTIVE_FLAG: &str = "aktiv";
pub const CRM_ACTIVE_FLAG: &str = "Active__c";
