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

//! Seams between the pipeline and the outside world.
//!
//! The coordinator and writer only speak to these traits; production wiring
//! adapts the HTTP clients onto them (see `adapters`), tests use in-memory
//! fakes.

use std::time::Instant;

use async_trait::async_trait;
use pm_client::{ActivityCondition, PnlCondition};

use crate::error::SyncResult;

/// The two upstream subgraphs, cursor- and deadline-aware
#[async_trait]
pub trait ConditionSource: Send + Sync {
  /// Activity-subgraph conditions created strictly after `after`
  async fn activity_conditions(
    &self,
    after: Option<i64>,
    deadline: Instant,
  ) -> SyncResult<Vec<ActivityCondition>>;

  /// PnL-subgraph conditions created strictly after `after`
  async fn pnl_conditions(
    &self,
    after: Option<i64>,
    deadline: Instant,
  ) -> SyncResult<Vec<PnlCondition>>;
}

/// Content-addressed retrieval of metadata documents and image assets
#[async_trait]
pub trait MetadataGateway: Send + Sync {
  async fn metadata_document(&self, content_hash: &str) -> SyncResult<serde_json::Value>;

  async fn asset_bytes(&self, content_hash: &str) -> SyncResult<Vec<u8>>;
}

/// Destination for mirrored icons; returns the stored object's public URL
#[async_trait]
pub trait IconStore: Send + Sync {
  async fn store_icon(
    &self,
    path: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> SyncResult<String>;
}
