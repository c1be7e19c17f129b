//! JioSaavn provider.
//!
//! Talks to the public `api.php` JSON endpoint: `search.getResults` for
//! search, `reco.getreco` for "up next" recommendations, and
//! `content.getTrending` as a fallback when a song has no recommendations.

use crate::error::{Result, SourceError};
use crate::http::{build_client, get_text, normalize_base_url};
use async_trait::async_trait;
use reqwest::Client;
use riff_core::{Track, TrackProvider, TrackSource};
use serde::Deserialize;
use tracing::{debug, info};

/// Public JioSaavn endpoint.
pub const DEFAULT_SAAVN_URL: &str = "https://www.jiosaavn.com";

/// Parameters every `api.php` call carries.
const COMMON_PARAMS: [(&str, &str); 4] = [
    ("_format", "json"),
    ("_marker", "0"),
    ("api_version", "4"),
    ("ctx", "web6dot0"),
];

/// Number of search results requested.
const SEARCH_PAGE_SIZE: &str = "20";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    perma_url: String,
    #[serde(default)]
    more_info: MoreInfo,
}

#[derive(Debug, Default, Deserialize)]
struct MoreInfo {
    #[serde(default, rename = "artistMap")]
    artist_map: ArtistMap,
}

#[derive(Debug, Default, Deserialize)]
struct ArtistMap {
    #[serde(default)]
    primary_artists: Vec<Artist>,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    #[serde(default)]
    name: String,
}

impl Song {
    fn into_track(self) -> Option<Track> {
        if self.perma_url.is_empty() {
            return None;
        }

        let map = self.more_info.artist_map;
        let artists = if map.primary_artists.is_empty() {
            map.artists.into_iter().take(1).collect()
        } else {
            map.primary_artists
        };
        let artist = artists
            .iter()
            .map(|a| unescape_html(&a.name))
            .collect::<Vec<_>>()
            .join(", ");

        Some(
            Track::new(unescape_html(&self.title), artist, self.perma_url, TrackSource::Saavn)
                .with_id(self.id),
        )
    }
}

/// The API returns titles with HTML entities.
fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn parse_songs(body: &str, what: &str) -> Result<Vec<Track>> {
    let songs: Vec<Song> = serde_json::from_str(body)
        .map_err(|e| SourceError::ParseError(format!("Failed to parse {}: {}", what, e)))?;
    Ok(songs.into_iter().filter_map(Song::into_track).collect())
}

/// Client for the JioSaavn JSON API.
#[derive(Debug, Clone)]
pub struct SaavnClient {
    http: Client,
    base_url: String,
}

impl SaavnClient {
    /// Create a client against `base_url` (normally [`DEFAULT_SAAVN_URL`]).
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: build_client("Mozilla/5.0")?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/api.php", self.base_url);
        let mut query: Vec<(&str, &str)> = COMMON_PARAMS.to_vec();
        query.extend_from_slice(params);
        get_text(&self.http, &url, &query).await
    }

    /// Search songs.
    pub async fn search_songs(&self, query: &str) -> Result<Vec<Track>> {
        let body = self
            .call(&[
                ("__call", "search.getResults"),
                ("p", "1"),
                ("n", SEARCH_PAGE_SIZE),
                ("q", query),
            ])
            .await?;

        let response: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            SourceError::ParseError(format!("Failed to parse search results: {}", e))
        })?;
        let tracks: Vec<Track> = response
            .results
            .into_iter()
            .filter_map(Song::into_track)
            .collect();

        info!(query = %query, count = tracks.len(), "Saavn search complete");
        Ok(tracks)
    }

    /// Recommended follow-ups for a song, or trending songs when there are
    /// none.
    pub async fn recommendations(&self, song_id: &str) -> Result<Vec<Track>> {
        let body = self.call(&[("__call", "reco.getreco"), ("pid", song_id)]).await?;

        if body.trim() == "[]" {
            debug!(song_id = %song_id, "No recommendations, falling back to trending");
            return self.trending().await;
        }

        parse_songs(&body, "recommendations")
    }

    /// Trending English songs.
    pub async fn trending(&self) -> Result<Vec<Track>> {
        let body = self
            .call(&[
                ("__call", "content.getTrending"),
                ("entity_type", "song"),
                ("entity_language", "english"),
            ])
            .await?;
        parse_songs(&body, "trending songs")
    }
}

#[async_trait]
impl TrackProvider for SaavnClient {
    fn source(&self) -> TrackSource {
        TrackSource::Saavn
    }

    async fn search(&self, query: &str) -> riff_core::Result<Vec<Track>> {
        Ok(self.search_songs(query).await?)
    }

    async fn fetch_continuation(&self, track: &Track) -> riff_core::Result<Vec<Track>> {
        if track.id.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.recommendations(&track.id).await?)
    }
}
