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

//! Persistence writer
//!
//! Writes one merged condition and its metadata into the store in dependency
//! order: condition, then event (get-or-create), then market, then outcomes
//! and tags. The order is load-bearing; foreign keys point backwards along
//! it.

use bigdecimal::{BigDecimal, FromPrimitive};
use chrono::{DateTime, Utc};
use pm_database_postgres::models::{Event, NewCondition, NewEvent, NewMarket, NewOutcome};
use pm_database_postgres::SyncStore;
use tracing::{debug, info, warn};

use crate::assets::{event_icon_path, market_icon_path, mirror_icon};
use crate::error::{SyncError, SyncResult};
use crate::metadata::MarketMetadata;
use crate::pipeline::{IconStore, MetadataGateway};
use crate::types::MergedCondition;

pub struct PersistenceWriter<'a> {
  store: &'a dyn SyncStore,
  gateway: &'a dyn MetadataGateway,
  icons: Option<&'a dyn IconStore>,
}

impl<'a> PersistenceWriter<'a> {
  pub fn new(
    store: &'a dyn SyncStore,
    gateway: &'a dyn MetadataGateway,
    icons: Option<&'a dyn IconStore>,
  ) -> Self {
    Self { store, gateway, icons }
  }

  /// Persist one condition and everything hanging off it. Returns false when
  /// a market already exists for the condition and nothing was written.
  pub async fn persist(
    &self,
    condition: &MergedCondition,
    document: &serde_json::Value,
  ) -> SyncResult<bool> {
    let metadata = MarketMetadata::from_value(document, &condition.id)?;

    let creator = condition.creator.clone().ok_or_else(|| SyncError::MissingField {
      condition_id: condition.id.clone(),
      field: "creator".to_string(),
    })?;

    if self.store.market_exists(&condition.id).await? {
      debug!("Market already exists for condition {}; skipping", condition.id);
      return Ok(false);
    }

    self
      .store
      .upsert_condition(NewCondition {
        id: condition.id.clone(),
        oracle: condition.oracle.clone(),
        question_id: condition.question_id.clone(),
        resolved: condition.resolved,
        arweave_hash: condition.arweave_hash.clone(),
        creator: Some(creator.clone()),
        created_at: timestamp_to_datetime(condition.creation_timestamp),
      })
      .await?;

    let event = self.get_or_create_event(&metadata, &creator).await?;

    let market_icon_url = match &metadata.icon {
      Some(hash) => {
        mirror_icon(self.gateway, self.icons, hash, &market_icon_path(&metadata.slug)).await
      }
      None => None,
    };

    let is_active = !condition.resolved;
    let inserted = self
      .store
      .insert_market(NewMarket {
        condition_id: condition.id.clone(),
        event_id: event.id,
        title: metadata.name.clone(),
        slug: metadata.slug.clone(),
        short_title: metadata.short_title.clone(),
        icon_url: market_icon_url,
        is_active,
        is_resolved: condition.resolved,
        metadata: Some(document.clone()),
      })
      .await?;

    if inserted {
      self.store.increment_event_counters(event.id, is_active).await?;
    } else {
      // (event_id, slug) collision: a market with this slug already exists
      // under the event, treat as already-present
      debug!("Market for condition {} collided on (event, slug); skipping", condition.id);
      return Ok(false);
    }

    let outcome_rows: Vec<NewOutcome> = metadata
      .outcomes_or_default()
      .iter()
      .enumerate()
      .map(|(index, outcome)| NewOutcome {
        condition_id: condition.id.clone(),
        outcome_text: outcome.outcome.clone(),
        outcome_index: index as i32,
        token_id: outcome
          .token_id
          .clone()
          .unwrap_or_else(|| format!("{}{}", condition.id, index)),
        price: outcome.price.and_then(BigDecimal::from_f64),
        volume: None,
      })
      .collect();
    self.store.insert_outcomes(outcome_rows).await?;

    info!("Persisted condition {} (event {}, market {})", condition.id, event.slug, metadata.slug);
    Ok(true)
  }

  /// Return the event for this metadata's descriptor, creating it on first
  /// sight. Icon download and tag linking happen only for newly created
  /// events.
  async fn get_or_create_event(
    &self,
    metadata: &MarketMetadata,
    creator: &str,
  ) -> SyncResult<Event> {
    let descriptor = metadata.event_or_default();

    if let Some(existing) = self.store.find_event_by_slug(&descriptor.slug).await? {
      debug!("Reusing event {} for slug {}", existing.id, descriptor.slug);
      return Ok(existing);
    }

    let icon_url = match &descriptor.icon {
      Some(hash) => {
        mirror_icon(self.gateway, self.icons, hash, &event_icon_path(&descriptor.slug)).await
      }
      None => None,
    };

    let event = self
      .store
      .insert_event(NewEvent {
        slug: descriptor.slug.clone(),
        title: descriptor.title.clone(),
        creator: Some(creator.to_string()),
        icon_url,
        show_market_icons: descriptor.show_market_icons,
        rules: descriptor.rules.clone(),
      })
      .await?;

    self.link_tags(event.id, &metadata.tags).await?;
    Ok(event)
  }

  async fn link_tags(&self, event_id: i32, tags: &[serde_json::Value]) -> SyncResult<()> {
    for entry in tags {
      let Some(name) = entry.as_str() else {
        warn!("Skipping non-string tag entry {} on event {}", entry, event_id);
        continue;
      };

      let slug = normalize_tag_slug(name);
      if slug.is_empty() {
        warn!("Skipping tag {:?}: normalizes to an empty slug", name);
        continue;
      }

      let tag = self.store.find_or_create_tag(&slug, name).await?;
      self.store.link_event_tag(event_id, tag.id).await?;
    }
    Ok(())
  }
}

/// Lowercase, map every non-alphanumeric run to a single hyphen, trim, and
/// truncate to the column width.
pub fn normalize_tag_slug(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut last_was_hyphen = true; // swallows leading hyphens
  for c in name.to_lowercase().chars() {
    if c.is_ascii_alphanumeric() {
      slug.push(c);
      last_was_hyphen = false;
    } else if !last_was_hyphen {
      slug.push('-');
      last_was_hyphen = true;
    }
  }
  while slug.ends_with('-') {
    slug.pop();
  }
  slug.truncate(100);
  slug
}

fn timestamp_to_datetime(unix_seconds: i64) -> DateTime<Utc> {
  DateTime::<Utc>::from_timestamp(unix_seconds, 0).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{FakeGateway, FakeIcons, InMemoryStore};
  use serde_json::json;

  fn condition(id: &str) -> MergedCondition {
    MergedCondition {
      id: id.to_string(),
      oracle: "0xO".to_string(),
      question_id: "0xQ".to_string(),
      resolved: false,
      arweave_hash: format!("hash-{}", id),
      creator: Some("0xC".to_string()),
      creation_timestamp: 1700000000,
    }
  }

  fn document(name: &str, slug: &str, event_slug: &str) -> serde_json::Value {
    json!({
      "name": name,
      "slug": slug,
      "event": { "slug": event_slug, "title": "Event" },
      "outcomes": [ { "outcome": "Yes" }, { "outcome": "No" } ]
    })
  }

  #[test]
  fn test_tag_normalization() {
    assert_eq!(normalize_tag_slug("U.S. Politics!"), "u-s-politics");
    assert_eq!(normalize_tag_slug("Sports"), "sports");
    assert_eq!(normalize_tag_slug("--- "), "");
    let long = "x".repeat(150);
    assert_eq!(normalize_tag_slug(&long).len(), 100);
  }

  #[tokio::test]
  async fn test_persist_writes_all_rows_in_order() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    let written = writer
      .persist(&condition("0x1"), &document("Will X happen?", "will-x-happen", "x-event"))
      .await
      .unwrap();
    assert!(written);

    let state = store.state().await;
    assert!(state.conditions.contains_key("0x1"));
    assert_eq!(state.events.len(), 1);
    assert_eq!(state.events[0].slug, "x-event");
    assert_eq!(state.markets.len(), 1);
    assert_eq!(state.markets[0].slug, "will-x-happen");
    assert_eq!(state.markets[0].event_id, state.events[0].id);
    let indices: Vec<i32> = state.outcomes.iter().map(|o| o.outcome_index).collect();
    assert_eq!(indices, vec![0, 1]);
  }

  #[tokio::test]
  async fn test_event_reused_across_conditions() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    writer
      .persist(&condition("0x1"), &document("A", "market-a", "election-2028"))
      .await
      .unwrap();
    writer
      .persist(&condition("0x2"), &document("B", "market-b", "election-2028"))
      .await
      .unwrap();

    let state = store.state().await;
    assert_eq!(state.events.len(), 1);
    assert_eq!(state.markets.len(), 2);
    assert_eq!(state.markets[0].event_id, state.markets[1].event_id);
    assert_eq!(state.events[0].total_markets_count, 2);
  }

  #[tokio::test]
  async fn test_persist_is_idempotent() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);
    let doc = document("A", "market-a", "event-a");

    assert!(writer.persist(&condition("0x1"), &doc).await.unwrap());
    assert!(!writer.persist(&condition("0x1"), &doc).await.unwrap());

    let state = store.state().await;
    assert_eq!(state.markets.len(), 1);
    assert_eq!(state.outcomes.len(), 2);
  }

  #[tokio::test]
  async fn test_missing_creator_is_a_per_condition_error() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    let mut cond = condition("0x1");
    cond.creator = None;
    let err = writer.persist(&cond, &document("A", "a", "e")).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingField { .. }));
    assert!(store.state().await.conditions.is_empty());
  }

  #[tokio::test]
  async fn test_outcome_token_id_fallback() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    writer.persist(&condition("0x1"), &document("A", "a", "e")).await.unwrap();

    let state = store.state().await;
    let token_ids: Vec<&str> = state.outcomes.iter().map(|o| o.token_id.as_str()).collect();
    assert_eq!(token_ids, vec!["0x10", "0x11"]);
  }

  #[tokio::test]
  async fn test_missing_outcomes_default_to_yes_no() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    writer
      .persist(&condition("0x1"), &json!({ "name": "A", "slug": "a" }))
      .await
      .unwrap();

    let state = store.state().await;
    let texts: Vec<&str> = state.outcomes.iter().map(|o| o.outcome_text.as_str()).collect();
    assert_eq!(texts, vec!["Yes", "No"]);
  }

  #[tokio::test]
  async fn test_tags_written_only_for_new_events() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    let doc_with_tags = json!({
      "name": "A", "slug": "a",
      "event": { "slug": "e", "title": "E" },
      "tags": ["U.S. Politics!", 42]
    });
    writer.persist(&condition("0x1"), &doc_with_tags).await.unwrap();

    let doc_same_event = json!({
      "name": "B", "slug": "b",
      "event": { "slug": "e", "title": "E" },
      "tags": ["Ignored For Existing Event"]
    });
    writer.persist(&condition("0x2"), &doc_same_event).await.unwrap();

    let state = store.state().await;
    assert_eq!(state.tags.len(), 1);
    assert_eq!(state.tags[0].slug, "u-s-politics");
    assert_eq!(state.tags[0].label, "U.S. Politics!");
    assert_eq!(state.event_tags.len(), 1);
  }

  #[tokio::test]
  async fn test_tag_row_reused_across_events() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    let doc_a = json!({
      "name": "A", "slug": "a", "event": { "slug": "e1", "title": "E1" },
      "tags": ["U.S. Politics!"]
    });
    let doc_b = json!({
      "name": "B", "slug": "b", "event": { "slug": "e2", "title": "E2" },
      "tags": ["u.s. politics"]
    });
    writer.persist(&condition("0x1"), &doc_a).await.unwrap();
    writer.persist(&condition("0x2"), &doc_b).await.unwrap();

    let state = store.state().await;
    assert_eq!(state.tags.len(), 1);
    assert_eq!(state.event_tags.len(), 2);
  }

  #[tokio::test]
  async fn test_market_icon_mirrored_and_recorded() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    gateway.put_asset("icon-1", vec![0x89, b'P', b'N', b'G']).await;
    let icons = FakeIcons::default();
    let writer = PersistenceWriter::new(&store, &gateway, Some(&icons));

    let doc = json!({ "name": "A", "slug": "a", "icon": "icon-1" });
    writer.persist(&condition("0x1"), &doc).await.unwrap();

    let state = store.state().await;
    assert_eq!(
      state.markets[0].icon_url.as_deref(),
      Some("https://assets.test/markets/icons/a.jpg")
    );
  }

  #[tokio::test]
  async fn test_icon_failure_does_not_block_persistence() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default(); // icon hash unknown -> download fails
    let icons = FakeIcons::default();
    let writer = PersistenceWriter::new(&store, &gateway, Some(&icons));

    let doc = json!({ "name": "A", "slug": "a", "icon": "gone" });
    assert!(writer.persist(&condition("0x1"), &doc).await.unwrap());
    let state = store.state().await;
    assert_eq!(state.markets[0].icon_url, None);
  }

  #[tokio::test]
  async fn test_metadata_blob_stored_verbatim() {
    let store = InMemoryStore::default();
    let gateway = FakeGateway::default();
    let writer = PersistenceWriter::new(&store, &gateway, None);

    let doc = json!({ "name": "A", "slug": "a", "customField": { "nested": true } });
    writer.persist(&condition("0x1"), &doc).await.unwrap();

    let state = store.state().await;
    assert_eq!(state.markets[0].metadata.as_ref().unwrap()["customField"]["nested"], true);
  }
}
