//! Icon mirroring: gateway download, object-storage re-upload
//!
//! Icons are cosmetic. Every failure path here degrades to `None` with a
//! logged warning; image loss never blocks ingestion of the underlying
//! condition/market/event data.

use tracing::warn;

use crate::pipeline::{IconStore, MetadataGateway};

/// Storage path for an event icon
pub fn event_icon_path(slug: &str) -> String {
  format!("events/icons/{}.jpg", slug)
}

/// Storage path for a market icon
pub fn market_icon_path(slug: &str) -> String {
  format!("markets/icons/{}.jpg", slug)
}

/// Download an image from the gateway and re-upload it at `dest_path`,
/// overwriting any previous object. Returns the stored public URL, or `None`
/// when no icon store is configured or any step fails.
pub async fn mirror_icon(
  gateway: &dyn MetadataGateway,
  icons: Option<&dyn IconStore>,
  content_hash: &str,
  dest_path: &str,
) -> Option<String> {
  let icons = icons?;

  let bytes = match gateway.asset_bytes(content_hash).await {
    Ok(bytes) => bytes,
    Err(e) => {
      warn!("Icon download failed for {}: {}", content_hash, e);
      return None;
    }
  };

  let content_type = sniff_content_type(&bytes);
  match icons.store_icon(dest_path, content_type, bytes).await {
    Ok(url) => Some(url),
    Err(e) => {
      warn!("Icon upload failed for {}: {}", dest_path, e);
      None
    }
  }
}

/// Best-effort content type from magic bytes; gateways serve raw bytes with
/// no reliable headers.
fn sniff_content_type(bytes: &[u8]) -> &'static str {
  if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
    "image/jpeg"
  } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
    "image/png"
  } else if bytes.starts_with(b"GIF8") {
    "image/gif"
  } else if bytes.starts_with(b"<svg") || bytes.starts_with(b"<?xml") {
    "image/svg+xml"
  } else {
    "application/octet-stream"
  }
}
