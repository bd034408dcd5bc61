// src/fetch/download.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// GET `url` and return the whole body. A non-success status is an error.
pub async fn download_bytes(client: &Client, url: &Url) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);
    let bytes = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .bytes()
        .await
        .with_context(|| format!("Reading body from {}", url))?;
    debug!(bytes = bytes.len(), "fetched {}", url);
    Ok(bytes.to_vec())
}
