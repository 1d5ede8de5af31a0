/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Run coordinator
//!
//! Owns one invocation end to end: claim the single-flight lock, derive the
//! resume cursor, fetch both sources within the time budget, merge and
//! filter, then process each new condition with per-condition error
//! containment. The terminal status (`completed`/`error`) is always written
//! back, so the next invocation can observe and, past the staleness window,
//! reclaim a crashed run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pm_core::{SERVICE_NAME, STALE_RUN_SECS};
use pm_database_postgres::models::run_status;
use pm_database_postgres::SyncStore;
use tracing::{error, info, warn};

use crate::cursor::resume_cursor;
use crate::error::SyncResult;
use crate::filter::{filter_by_creators, filter_new};
use crate::merge::merge_conditions;
use crate::pipeline::{ConditionSource, IconStore, MetadataGateway};
use crate::types::{ConditionError, MergedCondition, RunOutcome, RunReport};
use crate::writer::PersistenceWriter;

/// Name of the sync_status row this pipeline locks and reports through
pub const SUBGRAPH_NAME: &str = "conditions";

/// Everything the coordinator talks to
pub struct SyncDeps {
  pub store: Arc<dyn SyncStore>,
  pub source: Arc<dyn ConditionSource>,
  pub gateway: Arc<dyn MetadataGateway>,
  pub icons: Option<Arc<dyn IconStore>>,
}

pub struct SyncCoordinator {
  deps: SyncDeps,
  allow_list: Vec<String>,
  time_budget: Duration,
}

impl SyncCoordinator {
  pub fn new(deps: SyncDeps, allow_list: Vec<String>, time_budget: Duration) -> Self {
    Self { deps, allow_list, time_budget }
  }

  /// Execute one run. `full` ignores the resume cursor and replays history.
  pub async fn run(&self, full: bool) -> SyncResult<RunOutcome> {
    let claimed =
      self.deps.store.claim_run(SERVICE_NAME, SUBGRAPH_NAME, STALE_RUN_SECS).await?;
    if !claimed {
      info!("Another sync run is in progress; skipping");
      return Ok(RunOutcome::Skipped);
    }

    match self.execute(full).await {
      Ok(report) => {
        self
          .deps
          .store
          .finish_run(
            SERVICE_NAME,
            SUBGRAPH_NAME,
            run_status::COMPLETED,
            report.processed as i32,
            None,
          )
          .await?;
        info!(
          "Sync completed: {} processed, {} total, {} errors",
          report.processed,
          report.total,
          report.errors.len()
        );
        Ok(RunOutcome::Completed(report))
      }
      Err(e) => {
        // Best effort: the run already failed, a second failure here must
        // not mask the original error
        if let Err(status_err) = self
          .deps
          .store
          .finish_run(SERVICE_NAME, SUBGRAPH_NAME, run_status::ERROR, 0, Some(e.to_string()))
          .await
        {
          error!("Failed to record run failure: {}", status_err);
        }
        Err(e)
      }
    }
  }

  async fn execute(&self, full: bool) -> SyncResult<RunReport> {
    let deadline = Instant::now() + self.time_budget;

    let cursor = resume_cursor(self.deps.store.as_ref(), full).await?;

    let activity = self.deps.source.activity_conditions(cursor, deadline).await?;
    let pnl = self.deps.source.pnl_conditions(cursor, deadline).await?;
    info!("Fetched {} activity and {} pnl conditions", activity.len(), pnl.len());

    let mut merged = merge_conditions(&activity, &pnl);
    if !self.allow_list.is_empty() {
      merged = filter_by_creators(merged, &self.allow_list);
    }

    let candidate_ids: Vec<String> = merged.iter().map(|c| c.id.clone()).collect();
    let existing = self.deps.store.existing_condition_ids(&candidate_ids).await?;
    let fresh = filter_new(merged, &existing);

    if fresh.is_empty() {
      return Ok(RunReport::empty("No new markets to sync"));
    }

    let total = fresh.len();
    let writer = PersistenceWriter::new(
      self.deps.store.as_ref(),
      self.deps.gateway.as_ref(),
      self.deps.icons.as_deref(),
    );

    let mut processed = 0;
    let mut errors = Vec::new();
    for condition in &fresh {
      match self.process_one(&writer, condition).await {
        Ok(_) => processed += 1,
        Err(e) => {
          warn!("Failed to process condition {}: {}", condition.id, e);
          errors.push(ConditionError { condition_id: condition.id.clone(), error: e.to_string() });
        }
      }
    }

    Ok(RunReport { processed, total, errors, message: None })
  }

  /// One condition: metadata fetch plus the whole write sequence. Every
  /// error here is contained to this condition; the batch keeps going.
  async fn process_one(
    &self,
    writer: &PersistenceWriter<'_>,
    condition: &MergedCondition,
  ) -> SyncResult<bool> {
    let document = self.deps.gateway.metadata_document(&condition.arweave_hash).await?;
    writer.persist(condition, &document).await
  }
}
