//! Production wiring of the HTTP clients onto the pipeline seams

use std::time::Instant;

use async_trait::async_trait;
use pm_client::{ActivityCondition, GatewayClient, PnlCondition, StorageClient, SubgraphClient};

use crate::error::{SyncError, SyncResult};
use crate::pipeline::{ConditionSource, IconStore, MetadataGateway};

/// The two production subgraph endpoints as one `ConditionSource`
pub struct SubgraphSources {
  activity: SubgraphClient,
  pnl: SubgraphClient,
}

impl SubgraphSources {
  pub fn new(activity: SubgraphClient, pnl: SubgraphClient) -> Self {
    Self { activity, pnl }
  }
}

#[async_trait]
impl ConditionSource for SubgraphSources {
  async fn activity_conditions(
    &self,
    after: Option<i64>,
    deadline: Instant,
  ) -> SyncResult<Vec<ActivityCondition>> {
    self
      .activity
      .fetch_activity_conditions(after, deadline)
      .await
      .map_err(|e| SyncError::SourceError(e.to_string()))
  }

  async fn pnl_conditions(
    &self,
    after: Option<i64>,
    deadline: Instant,
  ) -> SyncResult<Vec<PnlCondition>> {
    self
      .pnl
      .fetch_pnl_conditions(after, deadline)
      .await
      .map_err(|e| SyncError::SourceError(e.to_string()))
  }
}

#[async_trait]
impl MetadataGateway for GatewayClient {
  async fn metadata_document(&self, content_hash: &str) -> SyncResult<serde_json::Value> {
    self.fetch_json(content_hash).await.map_err(|e| SyncError::MetadataError(e.to_string()))
  }

  async fn asset_bytes(&self, content_hash: &str) -> SyncResult<Vec<u8>> {
    self.fetch_bytes(content_hash).await.map_err(|e| SyncError::AssetError(e.to_string()))
  }
}

#[async_trait]
impl IconStore for StorageClient {
  async fn store_icon(
    &self,
    path: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> SyncResult<String> {
    self
      .upload(path, content_type, bytes)
      .await
      .map_err(|e| SyncError::AssetError(e.to_string()))
  }
}
