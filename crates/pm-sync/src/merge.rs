//! Two-source condition join

use std::collections::HashMap;

use pm_client::{ActivityCondition, PnlCondition};
use tracing::debug;

use crate::types::MergedCondition;

/// Join Activity and PnL condition lists by id.
///
/// The PnL list is indexed into a map and the Activity list drives iteration.
/// A condition appearing in only one source is dropped: it is not actionable
/// until both subgraphs have indexed it, so a one-sided appearance means "not
/// yet ready", not an error. A joined condition missing `oracle`,
/// `questionId`, `arweaveHash`, or a creation timestamp is dropped for the
/// same reason.
///
/// The result is sorted ascending by creation timestamp (ties broken by id)
/// so persistence order is deterministic and monotonic.
pub fn merge_conditions(
  activity: &[ActivityCondition],
  pnl: &[PnlCondition],
) -> Vec<MergedCondition> {
  let pnl_by_id: HashMap<&str, &PnlCondition> =
    pnl.iter().map(|c| (c.id.as_str(), c)).collect();

  let mut merged = Vec::with_capacity(activity.len());
  for cond in activity {
    let Some(pnl_cond) = pnl_by_id.get(cond.id.as_str()) else {
      debug!("Skipping condition {}: not yet indexed by the PnL subgraph", cond.id);
      continue;
    };

    let (Some(oracle), Some(question_id)) = (&pnl_cond.oracle, &pnl_cond.question_id) else {
      debug!("Skipping condition {}: PnL record incomplete", cond.id);
      continue;
    };

    let Some(arweave_hash) = &cond.arweave_hash else {
      debug!("Skipping condition {}: no metadata hash yet", cond.id);
      continue;
    };

    let Some(creation_timestamp) =
      cond.creation_timestamp.or(pnl_cond.creation_timestamp)
    else {
      debug!("Skipping condition {}: no creation timestamp", cond.id);
      continue;
    };

    merged.push(MergedCondition {
      id: cond.id.clone(),
      oracle: oracle.clone(),
      question_id: question_id.clone(),
      resolved: pnl_cond.resolved,
      arweave_hash: arweave_hash.clone(),
      creator: cond.creator.clone(),
      creation_timestamp,
    });
  }

  merged.sort_by(|a, b| {
    a.creation_timestamp.cmp(&b.creation_timestamp).then_with(|| a.id.cmp(&b.id))
  });
  merged
}
