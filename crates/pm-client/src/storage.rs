//! Object-storage uploads for event and market icons

use pm_core::{Error, Result, StorageConfig};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for the object-storage upload API. Uploads overwrite on conflict
/// (`x-upsert`), so re-processing a condition re-writes the same icon path.
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client from config
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pm-client/0.1.0")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    /// Upload a binary object at `path` and return its public URL
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        debug!("Uploading object to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Storage upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "Storage upload returned HTTP {} for {}",
                status, path
            )));
        }

        Ok(self.public_url(path))
    }

    /// Public URL for an object path in this bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}
