//! Shared HTTP plumbing.

use crate::error::{Result, SourceError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Validate and normalize a base URL (no trailing slash).
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    if base_url.is_empty() {
        return Err(SourceError::InvalidUrl("URL cannot be empty".into()));
    }

    let parsed = Url::parse(base_url).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SourceError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(base_url.trim_end_matches('/').to_string())
}

/// HTTP client with the timeouts used by every provider.
pub(crate) fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()
        .map_err(SourceError::Request)
}

/// GET `url` with `query` and return the body of a successful response.
pub(crate) async fn get_text(http: &Client, url: &str, query: &[(&str, &str)]) -> Result<String> {
    debug!(url = %url, "Sending request");

    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(SourceError::from_send)?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }

    response.text().await.map_err(SourceError::Request)
}
