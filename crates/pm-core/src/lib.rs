//! # pm-core
//!
//! Shared configuration, errors, and constants for the market sync pipeline.

pub mod config;
pub mod error;

pub use config::{Config, StorageConfig};
pub use error::{Error, Result};

/// Public content gateway used when PM_GATEWAY_URL is not set
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.irys.xyz";

/// Subgraph page size for condition queries
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Soft wall-clock budget per invocation, kept below the platform timeout
pub const DEFAULT_TIME_BUDGET_SECS: u64 = 250;

/// Request timeout for individual HTTP calls
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// A `running` sync_status row older than this is treated as a crashed run
pub const STALE_RUN_SECS: i64 = 15 * 60;

/// service_name recorded in sync_status rows
pub const SERVICE_NAME: &str = "market-sync";

/// Deployment seed entry for the creator allow-list; merged with
/// PM_CREATOR_ALLOWLIST when the filter is enabled.
pub const DEFAULT_CREATOR_ALLOWLIST: &[&str] = &["0x1ae35e9c1bd2b810cbbc41f0ed11f9c7a23dbae7"];
