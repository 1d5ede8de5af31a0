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

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SyncError {
  #[error("Subgraph error: {0}")]
  SourceError(String),

  #[error("Metadata error: {0}")]
  MetadataError(String),

  #[error("Condition {condition_id} is missing required field `{field}`")]
  MissingField { condition_id: String, field: String },

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Asset error: {0}")]
  AssetError(String),

  #[error("Configuration error: {0}")]
  ConfigurationError(String),
}

// Implement conversions manually
impl From<pm_core::Error> for SyncError {
  fn from(err: pm_core::Error) -> Self {
    SyncError::SourceError(err.to_string())
  }
}

impl From<pm_database_postgres::StoreError> for SyncError {
  fn from(err: pm_database_postgres::StoreError) -> Self {
    SyncError::DatabaseError(err.to_string())
  }
}

impl From<serde_json::Error> for SyncError {
  fn from(err: serde_json::Error) -> Self {
    SyncError::MetadataError(err.to_string())
  }
}

pub type SyncResult<T> = Result<T, SyncError>;
