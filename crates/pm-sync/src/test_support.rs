//! In-memory fakes for the pipeline seams, shared across test modules

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pm_client::{ActivityCondition, PnlCondition};
use pm_database_postgres::models::{
  Condition, Event, NewCondition, NewEvent, NewMarket, NewOutcome, SyncStatus, Tag,
};
use pm_database_postgres::{StoreError, StoreResult, SyncStore};
use tokio::sync::Mutex;

use crate::error::{SyncError, SyncResult};
use crate::pipeline::{ConditionSource, IconStore, MetadataGateway};

#[derive(Default)]
pub struct StoreState {
  pub conditions: HashMap<String, NewCondition>,
  pub events: Vec<Event>,
  pub markets: Vec<NewMarket>,
  pub outcomes: Vec<NewOutcome>,
  pub tags: Vec<Tag>,
  pub event_tags: Vec<(i32, i32)>,
  /// (status, processed, error) per finish_run call
  pub finished: Vec<(String, i32, Option<String>)>,
  pub status_row: Option<SyncStatus>,
  next_event_id: i32,
  next_tag_id: i32,
}

/// Hand-rolled `SyncStore` over plain collections
#[derive(Default)]
pub struct InMemoryStore {
  state: Mutex<StoreState>,
}

impl InMemoryStore {
  pub async fn state(&self) -> tokio::sync::MutexGuard<'_, StoreState> {
    self.state.lock().await
  }

  /// Seed a `running` status row whose heartbeat is `age_secs` old
  pub async fn seed_running_status(&self, age_secs: i64) {
    self.state.lock().await.status_row = Some(SyncStatus {
      id: 1,
      service_name: "market-sync".to_string(),
      subgraph_name: "conditions".to_string(),
      status: "running".to_string(),
      updated_at: Utc::now() - Duration::seconds(age_secs),
      total_processed: None,
      error_message: None,
    });
  }

  /// Seed a committed condition+market pair with the given creation timestamp
  pub async fn seed_market(&self, condition_id: &str, creation_timestamp: i64) {
    let mut state = self.state.lock().await;
    state.conditions.insert(
      condition_id.to_string(),
      NewCondition {
        id: condition_id.to_string(),
        oracle: "0xO".to_string(),
        question_id: "0xQ".to_string(),
        resolved: false,
        arweave_hash: "h".to_string(),
        creator: Some("0xC".to_string()),
        created_at: DateTime::<Utc>::from_timestamp(creation_timestamp, 0)
          .unwrap_or_else(Utc::now),
      },
    );
    state.markets.push(NewMarket {
      condition_id: condition_id.to_string(),
      event_id: 1,
      title: condition_id.to_string(),
      slug: condition_id.to_string(),
      short_title: None,
      icon_url: None,
      is_active: true,
      is_resolved: false,
      metadata: None,
    });
  }
}

#[async_trait]
impl SyncStore for InMemoryStore {
  async fn latest_market_cursor(&self) -> StoreResult<Option<i64>> {
    let state = self.state.lock().await;
    Ok(
      state
        .markets
        .iter()
        .filter_map(|m| state.conditions.get(&m.condition_id))
        .map(|c| c.created_at.timestamp())
        .max(),
    )
  }

  async fn existing_condition_ids(&self, ids: &[String]) -> StoreResult<HashSet<String>> {
    let state = self.state.lock().await;
    let with_markets: HashSet<&str> =
      state.markets.iter().map(|m| m.condition_id.as_str()).collect();
    Ok(ids.iter().filter(|id| with_markets.contains(id.as_str())).cloned().collect())
  }

  async fn upsert_condition(&self, condition: NewCondition) -> StoreResult<Condition> {
    let mut state = self.state.lock().await;
    let row = Condition {
      id: condition.id.clone(),
      oracle: condition.oracle.clone(),
      question_id: condition.question_id.clone(),
      resolved: condition.resolved,
      arweave_hash: condition.arweave_hash.clone(),
      creator: condition.creator.clone(),
      created_at: condition.created_at,
      updated_at: Utc::now(),
    };
    state.conditions.insert(condition.id.clone(), condition);
    Ok(row)
  }

  async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
    let state = self.state.lock().await;
    Ok(state.events.iter().find(|e| e.slug == slug).cloned())
  }

  async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
    let mut state = self.state.lock().await;
    if state.events.iter().any(|e| e.slug == event.slug) {
      return Err(StoreError::ConstraintViolation(format!(
        "duplicate key value violates unique constraint on events.slug: {}",
        event.slug
      )));
    }
    state.next_event_id += 1;
    let row = Event {
      id: state.next_event_id,
      slug: event.slug,
      title: event.title,
      creator: event.creator,
      icon_url: event.icon_url,
      show_market_icons: event.show_market_icons,
      rules: event.rules,
      active_markets_count: 0,
      total_markets_count: 0,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    state.events.push(row.clone());
    Ok(row)
  }

  async fn increment_event_counters(
    &self,
    event_id: i32,
    market_is_active: bool,
  ) -> StoreResult<()> {
    let mut state = self.state.lock().await;
    if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
      event.total_markets_count += 1;
      if market_is_active {
        event.active_markets_count += 1;
      }
    }
    Ok(())
  }

  async fn market_exists(&self, condition_id: &str) -> StoreResult<bool> {
    let state = self.state.lock().await;
    Ok(state.markets.iter().any(|m| m.condition_id == condition_id))
  }

  async fn insert_market(&self, market: NewMarket) -> StoreResult<bool> {
    let mut state = self.state.lock().await;
    let conflict = state.markets.iter().any(|m| {
      m.condition_id == market.condition_id
        || (m.event_id == market.event_id && m.slug == market.slug)
    });
    if conflict {
      return Ok(false);
    }
    state.markets.push(market);
    Ok(true)
  }

  async fn insert_outcomes(&self, outcomes: Vec<NewOutcome>) -> StoreResult<usize> {
    let mut state = self.state.lock().await;
    let mut inserted = 0;
    for outcome in outcomes {
      let conflict = state.outcomes.iter().any(|o| {
        o.token_id == outcome.token_id
          || (o.condition_id == outcome.condition_id && o.outcome_index == outcome.outcome_index)
      });
      if !conflict {
        state.outcomes.push(outcome);
        inserted += 1;
      }
    }
    Ok(inserted)
  }

  async fn find_or_create_tag(&self, slug: &str, label: &str) -> StoreResult<Tag> {
    let mut state = self.state.lock().await;
    if let Some(tag) = state.tags.iter().find(|t| t.slug == slug) {
      return Ok(tag.clone());
    }
    state.next_tag_id += 1;
    let tag = Tag { id: state.next_tag_id, slug: slug.to_string(), label: label.to_string() };
    state.tags.push(tag.clone());
    Ok(tag)
  }

  async fn link_event_tag(&self, event_id: i32, tag_id: i32) -> StoreResult<()> {
    let mut state = self.state.lock().await;
    if !state.event_tags.contains(&(event_id, tag_id)) {
      state.event_tags.push((event_id, tag_id));
    }
    Ok(())
  }

  async fn claim_run(
    &self,
    service: &str,
    subgraph: &str,
    stale_after_secs: i64,
  ) -> StoreResult<bool> {
    let mut state = self.state.lock().await;
    if let Some(row) = &state.status_row {
      let stale_before = Utc::now() - Duration::seconds(stale_after_secs);
      if row.status == "running" && row.updated_at >= stale_before {
        return Ok(false);
      }
    }
    state.status_row = Some(SyncStatus {
      id: 1,
      service_name: service.to_string(),
      subgraph_name: subgraph.to_string(),
      status: "running".to_string(),
      updated_at: Utc::now(),
      total_processed: None,
      error_message: None,
    });
    Ok(true)
  }

  async fn finish_run(
    &self,
    service: &str,
    subgraph: &str,
    status: &str,
    processed: i32,
    error: Option<String>,
  ) -> StoreResult<()> {
    let mut state = self.state.lock().await;
    state.finished.push((status.to_string(), processed, error.clone()));
    state.status_row = Some(SyncStatus {
      id: 1,
      service_name: service.to_string(),
      subgraph_name: subgraph.to_string(),
      status: status.to_string(),
      updated_at: Utc::now(),
      total_processed: Some(processed),
      error_message: error,
    });
    Ok(())
  }

  async fn current_status(
    &self,
    _service: &str,
    _subgraph: &str,
  ) -> StoreResult<Option<SyncStatus>> {
    Ok(self.state.lock().await.status_row.clone())
  }
}

#[derive(Default)]
struct SourceState {
  activity: Vec<ActivityCondition>,
  pnl: Vec<PnlCondition>,
  fail_activity: Option<String>,
  fetch_count: usize,
  last_activity_cursor: Option<i64>,
}

/// Scripted `ConditionSource` honoring the `after` cursor
#[derive(Default)]
pub struct FakeSource {
  state: Mutex<SourceState>,
}

impl FakeSource {
  pub async fn push_activity(&self, condition: ActivityCondition) {
    self.state.lock().await.activity.push(condition);
  }

  pub async fn push_pnl(&self, condition: PnlCondition) {
    self.state.lock().await.pnl.push(condition);
  }

  pub async fn fail_activity(&self, message: &str) {
    self.state.lock().await.fail_activity = Some(message.to_string());
  }

  pub async fn fetch_count(&self) -> usize {
    self.state.lock().await.fetch_count
  }

  /// The `after` argument of the most recent activity fetch
  pub async fn last_activity_cursor(&self) -> Option<i64> {
    self.state.lock().await.last_activity_cursor
  }
}

#[async_trait]
impl ConditionSource for FakeSource {
  async fn activity_conditions(
    &self,
    after: Option<i64>,
    _deadline: Instant,
  ) -> SyncResult<Vec<ActivityCondition>> {
    let mut state = self.state.lock().await;
    state.fetch_count += 1;
    state.last_activity_cursor = after;
    if let Some(message) = &state.fail_activity {
      return Err(SyncError::SourceError(message.clone()));
    }
    Ok(
      state
        .activity
        .iter()
        .filter(|c| after.is_none() || c.creation_timestamp > after)
        .cloned()
        .collect(),
    )
  }

  async fn pnl_conditions(
    &self,
    after: Option<i64>,
    _deadline: Instant,
  ) -> SyncResult<Vec<PnlCondition>> {
    let mut state = self.state.lock().await;
    state.fetch_count += 1;
    Ok(
      state
        .pnl
        .iter()
        .filter(|c| after.is_none() || c.creation_timestamp > after)
        .cloned()
        .collect(),
    )
  }
}

#[derive(Default)]
struct GatewayState {
  documents: HashMap<String, serde_json::Value>,
  assets: HashMap<String, Vec<u8>>,
}

/// Scripted content gateway; unknown hashes fail like a 404
#[derive(Default)]
pub struct FakeGateway {
  state: Mutex<GatewayState>,
}

impl FakeGateway {
  pub async fn put_document(&self, content_hash: &str, document: serde_json::Value) {
    self.state.lock().await.documents.insert(content_hash.to_string(), document);
  }

  pub async fn put_asset(&self, content_hash: &str, bytes: Vec<u8>) {
    self.state.lock().await.assets.insert(content_hash.to_string(), bytes);
  }
}

#[async_trait]
impl MetadataGateway for FakeGateway {
  async fn metadata_document(&self, content_hash: &str) -> SyncResult<serde_json::Value> {
    self.state.lock().await.documents.get(content_hash).cloned().ok_or_else(|| {
      SyncError::MetadataError(format!("Gateway returned HTTP 404 for {}", content_hash))
    })
  }

  async fn asset_bytes(&self, content_hash: &str) -> SyncResult<Vec<u8>> {
    self.state.lock().await.assets.get(content_hash).cloned().ok_or_else(|| {
      SyncError::AssetError(format!("Gateway returned HTTP 404 for {}", content_hash))
    })
  }
}

/// Records uploads and hands back deterministic public URLs
#[derive(Default)]
pub struct FakeIcons {
  uploads: Mutex<Vec<(String, String)>>,
}

impl FakeIcons {
  /// (path, content_type) pairs in upload order
  pub async fn uploads(&self) -> Vec<(String, String)> {
    self.uploads.lock().await.clone()
  }
}

#[async_trait]
impl IconStore for FakeIcons {
  async fn store_icon(
    &self,
    path: &str,
    content_type: &str,
    _bytes: Vec<u8>,
  ) -> SyncResult<String> {
    self.uploads.lock().await.push((path.to_string(), content_type.to_string()));
    Ok(format!("https://assets.test/{}", path))
  }
}
