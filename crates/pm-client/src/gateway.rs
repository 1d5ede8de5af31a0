//! Content-addressed gateway retrieval (metadata documents and images)

use pm_core::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP client for an Arweave/Irys-style gateway: a content hash maps to an
/// immutable JSON document or image.
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pm-client/0.1.0")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url: base_url.into() })
    }

    /// Fetch and decode a JSON document by content hash
    #[instrument(skip(self))]
    pub async fn fetch_json(&self, content_hash: &str) -> Result<serde_json::Value> {
        let url = self.url_for(content_hash);
        debug!("Fetching metadata document from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "Gateway returned HTTP {} for {}",
                status, content_hash
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("Gateway document is not valid JSON: {}", e)))
    }

    /// Fetch raw bytes (an image) by content hash
    #[instrument(skip(self))]
    pub async fn fetch_bytes(&self, content_hash: &str) -> Result<Vec<u8>> {
        let url = self.url_for(content_hash);
        debug!("Fetching asset from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "Gateway returned HTTP {} for {}",
                status, content_hash
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("Failed to read gateway body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn url_for(&self, content_hash: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), content_hash)
    }
}
