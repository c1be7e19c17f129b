//! LRCLIB lyrics lookup.

use crate::error::{Result, SourceError};
use crate::http::{build_client, get_text, normalize_base_url};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Public LRCLIB endpoint.
pub const DEFAULT_LRCLIB_URL: &str = "https://lrclib.net";

/// Lyrics as returned by LRCLIB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsText {
    /// LRC text with `[mm:ss.xx]` timestamps
    Synced(String),
    /// Untimed text
    Plain(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LyricsResponse {
    #[serde(default)]
    synced_lyrics: Option<String>,
    #[serde(default)]
    plain_lyrics: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LrclibClient {
    http: Client,
    base_url: String,
}

impl LrclibClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: build_client(concat!("riff/", env!("CARGO_PKG_VERSION")))?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Look up lyrics by artist and title.
    ///
    /// Prefers synced lyrics. `Ok(None)` when LRCLIB has nothing.
    pub async fn fetch(&self, artist: &str, title: &str) -> Result<Option<LyricsText>> {
        if artist.is_empty() || title.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/api/get", self.base_url);
        let body = match get_text(
            &self.http,
            &url,
            &[("artist_name", artist), ("track_name", title)],
        )
        .await
        {
            Ok(body) => body,
            Err(SourceError::Status { status: 404, .. }) => {
                debug!(artist = %artist, title = %title, "No lyrics found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let response: LyricsResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::ParseError(format!("Failed to parse lyrics: {}", e)))?;

        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Ok(non_empty(response.synced_lyrics)
            .map(LyricsText::Synced)
            .or_else(|| non_empty(response.plain_lyrics).map(LyricsText::Plain)))
    }
}
