//! Configuration management for the market sync pipeline

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Object-storage credentials; icons are skipped entirely when unset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
  /// Storage API base URL
  pub base_url: String,

  /// Service key sent as a bearer token
  pub service_key: String,

  /// Bucket receiving event/market icons
  pub bucket: String,
}

/// Main configuration struct for the sync pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Postgres connection string
  pub database_url: String,

  /// Activity subgraph GraphQL endpoint
  pub activity_subgraph_url: String,

  /// PnL subgraph GraphQL endpoint
  pub pnl_subgraph_url: String,

  /// Content gateway base URL (metadata documents and images)
  pub gateway_url: String,

  /// Shared secret expected in the cron Authorization header
  pub cron_secret: String,

  /// Optional creator allow-list; empty disables the filter
  pub creator_allowlist: Vec<String>,

  /// Optional object storage for icons
  pub storage: Option<StorageConfig>,

  /// Soft wall-clock budget per invocation in seconds
  pub time_budget_secs: u64,

  /// Request timeout in seconds
  pub http_timeout_secs: u64,

  /// Subgraph page size
  pub page_size: u32,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let database_url =
      env::var("DATABASE_URL").map_err(|_| Error::Config("DATABASE_URL not set".to_string()))?;

    let activity_subgraph_url = env::var("PM_ACTIVITY_SUBGRAPH_URL")
      .map_err(|_| Error::Config("PM_ACTIVITY_SUBGRAPH_URL not set".to_string()))?;

    let pnl_subgraph_url = env::var("PM_PNL_SUBGRAPH_URL")
      .map_err(|_| Error::Config("PM_PNL_SUBGRAPH_URL not set".to_string()))?;

    let gateway_url =
      env::var("PM_GATEWAY_URL").unwrap_or_else(|_| crate::DEFAULT_GATEWAY_URL.to_string());

    let cron_secret =
      env::var("CRON_SECRET").map_err(|_| Error::Config("CRON_SECRET not set".to_string()))?;

    let creator_allowlist = match env::var("PM_CREATOR_ALLOWLIST") {
      Ok(raw) => {
        let mut list: Vec<String> = crate::DEFAULT_CREATOR_ALLOWLIST
          .iter()
          .map(|a| a.to_string())
          .collect();
        list.extend(
          raw
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
        );
        list
      }
      Err(_) => Vec::new(),
    };

    let storage = match (env::var("PM_STORAGE_URL"), env::var("PM_STORAGE_KEY")) {
      (Ok(base_url), Ok(service_key)) => Some(StorageConfig {
        base_url,
        service_key,
        bucket: env::var("PM_STORAGE_BUCKET").unwrap_or_else(|_| "public-assets".to_string()),
      }),
      _ => None,
    };

    let time_budget_secs = env::var("PM_TIME_BUDGET_SECS")
      .unwrap_or_else(|_| crate::DEFAULT_TIME_BUDGET_SECS.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid PM_TIME_BUDGET_SECS".to_string()))?;

    let http_timeout_secs = env::var("PM_HTTP_TIMEOUT_SECS")
      .unwrap_or_else(|_| crate::DEFAULT_HTTP_TIMEOUT_SECS.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid PM_HTTP_TIMEOUT_SECS".to_string()))?;

    let page_size = env::var("PM_PAGE_SIZE")
      .unwrap_or_else(|_| crate::DEFAULT_PAGE_SIZE.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid PM_PAGE_SIZE".to_string()))?;

    Ok(Config {
      database_url,
      activity_subgraph_url,
      pnl_subgraph_url,
      gateway_url,
      cron_secret,
      creator_allowlist,
      storage,
      time_budget_secs,
      http_timeout_secs,
      page_size,
    })
  }

  /// Create a config with default values (for testing)
  pub fn default_with_secret(cron_secret: String) -> Self {
    Config {
      database_url: "postgres://localhost/pm_test".to_string(),
      activity_subgraph_url: "http://localhost:8000/activity".to_string(),
      pnl_subgraph_url: "http://localhost:8000/pnl".to_string(),
      gateway_url: crate::DEFAULT_GATEWAY_URL.to_string(),
      cron_secret,
      creator_allowlist: Vec::new(),
      storage: None,
      time_budget_secs: crate::DEFAULT_TIME_BUDGET_SECS,
      http_timeout_secs: crate::DEFAULT_HTTP_TIMEOUT_SECS,
      page_size: crate::DEFAULT_PAGE_SIZE,
    }
  }
}
