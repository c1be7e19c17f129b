//! Domain types shared by providers, the playback core and front ends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend a track was obtained from
///
/// Used only to pick the continuation strategy for a selected track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// JioSaavn-style JSON API
    #[default]
    Saavn,

    /// SoundCloud
    SoundCloud,

    /// Last.fm-style search
    LastFm,

    /// Forest FM ambient radio (no continuation)
    ForestFm,
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackSource::Saavn => "saavn",
            TrackSource::SoundCloud => "soundcloud",
            TrackSource::LastFm => "lastfm",
            TrackSource::ForestFm => "forestfm",
        };
        f.write_str(name)
    }
}

/// A playable track
///
/// Tracks are plain values: every list that references a track holds its own
/// copy, nothing shares mutable ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Source-specific identifier (may be empty)
    #[serde(default)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Artist name
    pub artist: String,

    /// Playable URL handed to the media engine
    pub url: String,

    /// Originating backend (saved track lists may omit it)
    #[serde(default)]
    pub source: TrackSource,
}

impl Track {
    /// Create a track without an identifier
    pub fn new(
        name: impl Into<String>,
        artist: impl Into<String>,
        url: impl Into<String>,
        source: TrackSource,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            artist: artist.into(),
            url: url.into(),
            source,
        }
    }

    /// Attach a source-specific identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// `"name - artist"`, as shown in track lists
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.name, self.artist)
    }

    /// Whether a "related / next" lookup can be made for this track
    ///
    /// Tracks without an id (ambient radio streams) have no continuation.
    pub fn has_continuation(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_without_id_has_no_continuation() {
        let track = Track::new("Rain", "Forest", "https://forest.fm/rain.mp3", TrackSource::ForestFm);
        assert!(!track.has_continuation());
        assert!(track.clone().with_id("x").has_continuation());
    }

    #[test]
    fn source_serializes_lowercase() {
        let json = serde_json::to_string(&TrackSource::SoundCloud).unwrap();
        assert_eq!(json, "\"soundcloud\"");
        assert_eq!(TrackSource::LastFm.to_string(), "lastfm");
    }

    #[test]
    fn missing_id_deserializes_as_empty() {
        let json = r#"{"name":"A","artist":"B","url":"u","source":"saavn"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(track.id.is_empty());
        assert_eq!(track.source, TrackSource::Saavn);
    }

    #[test]
    fn missing_source_defaults_to_saavn() {
        let json = r#"{"name":"A","artist":"B","url":"u"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.source, TrackSource::Saavn);
    }
}
