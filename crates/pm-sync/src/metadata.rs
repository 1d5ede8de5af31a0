//! Metadata document validation
//!
//! Metadata documents are produced off-chain by market creators and are not
//! schema-enforced. Required fields (`name`, `slug`) hard-fail; optional
//! structure gets best-effort recovery: a missing event descriptor is
//! synthesized from the market's own name/slug, and a missing outcomes array
//! defaults to a binary Yes/No pair. Everything else in the document is
//! preserved verbatim in the flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SyncError, SyncResult};

/// Validated view over a condition's metadata document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketMetadata {
  pub name: String,
  pub slug: String,
  #[serde(default, rename = "shortTitle", skip_serializing_if = "Option::is_none")]
  pub short_title: Option<String>,
  /// Content hash of the market icon
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event: Option<EventDescriptor>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub outcomes: Vec<OutcomeDescriptor>,
  /// Raw tag entries; non-string entries are skipped at write time
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<Value>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventDescriptor {
  pub slug: String,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  #[serde(default = "default_true", rename = "showMarketIcons")]
  pub show_market_icons: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rules: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutcomeDescriptor {
  pub outcome: String,
  #[serde(default, rename = "tokenId", skip_serializing_if = "Option::is_none")]
  pub token_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<f64>,
}

fn default_true() -> bool {
  true
}

impl MarketMetadata {
  /// Validate a raw gateway document. Fails when required fields are absent
  /// or malformed, naming the condition the document belongs to.
  pub fn from_value(document: &Value, condition_id: &str) -> SyncResult<Self> {
    serde_json::from_value(document.clone()).map_err(|e| {
      SyncError::MetadataError(format!("Invalid metadata for condition {}: {}", condition_id, e))
    })
  }

  /// The event this market belongs to, synthesizing a single-market event
  /// from the market's own name/slug when the document has none.
  pub fn event_or_default(&self) -> EventDescriptor {
    self.event.clone().unwrap_or_else(|| EventDescriptor {
      slug: self.slug.clone(),
      title: self.name.clone(),
      icon: None,
      show_market_icons: true,
      rules: None,
    })
  }

  /// Declared outcomes, or the default binary pair when the document omits
  /// them.
  pub fn outcomes_or_default(&self) -> Vec<OutcomeDescriptor> {
    if !self.outcomes.is_empty() {
      return self.outcomes.clone();
    }
    ["Yes", "No"]
      .iter()
      .map(|o| OutcomeDescriptor { outcome: o.to_string(), token_id: None, price: None })
      .collect()
  }
}
