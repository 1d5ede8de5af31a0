//! Shared pipeline types

use serde::Serialize;

/// One condition joined across both subgraphs with every field the writer
/// needs. Built by the merger; conditions that cannot be completed from both
/// sources never become one of these.
#[derive(Debug, Clone)]
pub struct MergedCondition {
  pub id: String,
  pub oracle: String,
  pub question_id: String,
  pub resolved: bool,
  pub arweave_hash: String,
  pub creator: Option<String>,
  pub creation_timestamp: i64,
}

/// Per-condition failure recorded during a run
#[derive(Debug, Clone, Serialize)]
pub struct ConditionError {
  #[serde(rename = "conditionId")]
  pub condition_id: String,
  pub error: String,
}

/// Counts and error details for one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub processed: usize,
  pub total: usize,
  #[serde(rename = "errorDetails")]
  pub errors: Vec<ConditionError>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl RunReport {
  /// Report for a run that found nothing new upstream
  pub fn empty(message: impl Into<String>) -> Self {
    Self { processed: 0, total: 0, errors: Vec::new(), message: Some(message.into()) }
  }
}

/// What a single invocation of the coordinator did
#[derive(Debug, Clone)]
pub enum RunOutcome {
  /// Another run holds the lock; nothing was fetched or written
  Skipped,
  Completed(RunReport),
}
