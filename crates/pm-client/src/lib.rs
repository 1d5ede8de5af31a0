//! # pm-client
//!
//! HTTP clients used by the sync pipeline:
//! - [`SubgraphClient`]: paginated GraphQL condition queries against the
//!   Activity and PnL subgraphs
//! - [`GatewayClient`]: content-addressed metadata/image retrieval
//! - [`StorageClient`]: object-storage uploads for icons

pub mod gateway;
pub mod storage;
pub mod subgraph;

pub use gateway::GatewayClient;
pub use storage::StorageClient;
pub use subgraph::{ActivityCondition, PnlCondition, SubgraphClient};
