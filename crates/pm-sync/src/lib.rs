//! # pm-sync
//!
//! The incremental market synchronization pipeline.
//!
//! One run pulls condition records from two GraphQL subgraphs, merges them,
//! drops already-ingested and disallowed conditions, fetches each remaining
//! condition's metadata document from the content gateway, and persists
//! condition, event, market, outcome, and tag rows in dependency order.
//! Runs are single-flight, cursor-resumable, and bounded by a wall-clock
//! time budget.

pub mod assets;
pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod merge;
pub mod metadata;
pub mod pipeline;
pub mod types;
pub mod writer;

pub mod adapters;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use coordinator::{SyncCoordinator, SyncDeps, SUBGRAPH_NAME};
pub use error::{SyncError, SyncResult};
pub use pipeline::{ConditionSource, IconStore, MetadataGateway};
pub use types::{ConditionError, MergedCondition, RunOutcome, RunReport};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    ConditionError, ConditionSource, IconStore, MergedCondition, MetadataGateway, RunOutcome,
    RunReport, SyncCoordinator, SyncDeps, SyncError, SyncResult,
  };
}
