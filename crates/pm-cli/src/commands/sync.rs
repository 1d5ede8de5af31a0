use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use pm_client::{GatewayClient, StorageClient, SubgraphClient};
use pm_core::Config;
use pm_database_postgres::{PgSyncStore, SyncStore};
use pm_sync::adapters::SubgraphSources;
use pm_sync::{IconStore, RunOutcome, SyncCoordinator, SyncDeps, SUBGRAPH_NAME};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
  /// Run one sync pass against the subgraphs
  Run {
    /// Ignore the resume cursor and replay the full history
    #[arg(long)]
    full: bool,
  },

  /// Show the last recorded run status
  Status,
}

pub async fn handle_sync(cmd: SyncCommands, config: Config) -> Result<()> {
  match cmd {
    SyncCommands::Run { full } => run_sync(config, full).await,
    SyncCommands::Status => show_status(config).await,
  }
}

async fn run_sync(config: Config, full: bool) -> Result<()> {
  let coordinator = build_coordinator(&config)?;
  match coordinator.run(full).await? {
    RunOutcome::Completed(report) => {
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    RunOutcome::Skipped => {
      println!("Sync already running; skipped");
    }
  }
  Ok(())
}

async fn show_status(config: Config) -> Result<()> {
  let store = PgSyncStore::new(&config.database_url)?;
  match store.current_status(pm_core::SERVICE_NAME, SUBGRAPH_NAME).await? {
    Some(status) => {
      println!("service:    {}", status.service_name);
      println!("subgraph:   {}", status.subgraph_name);
      println!("status:     {}", status.status);
      println!("updated at: {}", status.updated_at);
      if let Some(processed) = status.total_processed {
        println!("processed:  {}", processed);
      }
      if let Some(error) = status.error_message {
        println!("error:      {}", error);
      }
    }
    None => println!("No sync run recorded yet"),
  }
  Ok(())
}

/// Wire the production clients and store into one coordinator.
pub fn build_coordinator(config: &Config) -> Result<SyncCoordinator> {
  let timeout = Duration::from_secs(config.http_timeout_secs);

  let store = Arc::new(PgSyncStore::new(&config.database_url)?);

  let activity =
    SubgraphClient::new(config.activity_subgraph_url.clone(), timeout, config.page_size)?;
  let pnl = SubgraphClient::new(config.pnl_subgraph_url.clone(), timeout, config.page_size)?;
  let source = Arc::new(SubgraphSources::new(activity, pnl));

  let gateway = Arc::new(GatewayClient::new(config.gateway_url.clone(), timeout)?);

  let icons = match &config.storage {
    Some(storage) => {
      let client = StorageClient::new(storage, timeout)?;
      Some(Arc::new(client) as Arc<dyn IconStore>)
    }
    None => {
      info!("No object storage configured; icons will not be mirrored");
      None
    }
  };

  Ok(SyncCoordinator::new(
    SyncDeps { store, source, gateway, icons },
    config.creator_allowlist.clone(),
    Duration::from_secs(config.time_budget_secs),
  ))
}
