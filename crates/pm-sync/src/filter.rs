//! Candidate filtering: existence diff and creator allow-list

use std::collections::HashSet;

use tracing::debug;

use crate::types::MergedCondition;

/// Keep only conditions not yet present in the store, preserving order.
/// `existing` is the batched lookup result for the candidates' ids.
pub fn filter_new(
  candidates: Vec<MergedCondition>,
  existing: &HashSet<String>,
) -> Vec<MergedCondition> {
  candidates.into_iter().filter(|c| !existing.contains(&c.id)).collect()
}

/// Keep only conditions whose creator is on the allow-list
/// (case-insensitive). Conditions without a creator are dropped.
pub fn filter_by_creators(
  candidates: Vec<MergedCondition>,
  allow_list: &[String],
) -> Vec<MergedCondition> {
  let allowed: HashSet<String> = allow_list.iter().map(|a| a.to_lowercase()).collect();

  candidates
    .into_iter()
    .filter(|c| match &c.creator {
      Some(creator) if allowed.contains(&creator.to_lowercase()) => true,
      Some(creator) => {
        debug!("Skipping condition {}: creator {} not on allow-list", c.id, creator);
        false
      }
      None => {
        debug!("Skipping condition {}: no creator recorded", c.id);
        false
      }
    })
    .collect()
}
