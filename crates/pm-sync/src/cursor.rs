//! Resume-cursor derivation

use pm_database_postgres::SyncStore;
use tracing::info;

use crate::error::SyncResult;

/// Derive the resumption cursor for this run.
///
/// The cursor is the creation timestamp of the newest condition with a
/// durably committed market, so a run that crashed mid-batch resumes from
/// committed state only and leaves no gaps. `full` ignores the cursor and
/// replays history from the beginning.
pub async fn resume_cursor(store: &dyn SyncStore, full: bool) -> SyncResult<Option<i64>> {
  if full {
    info!("Full sync requested; ignoring resume cursor");
    return Ok(None);
  }

  let cursor = store.latest_market_cursor().await?;
  match cursor {
    Some(ts) => info!("Resuming from creation timestamp {}", ts),
    None => info!("No committed markets yet; running a full historical sync"),
  }
  Ok(cursor)
}
