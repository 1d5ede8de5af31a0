use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use pm_core::Config;
use pm_web::AppState;
use tracing::info;

use super::sync::build_coordinator;

#[derive(Args, Debug)]
pub struct ServeCommand {
  /// Port to listen on
  #[arg(short, long, default_value_t = 3000, env = "PORT")]
  port: u16,
}

pub async fn execute(cmd: ServeCommand, config: Config) -> Result<()> {
  let coordinator = build_coordinator(&config)?;
  let state = AppState::new(Arc::new(coordinator), config.cron_secret.clone());
  info!("Starting sync trigger server");
  pm_web::serve(state, cmd.port).await?;
  Ok(())
}
