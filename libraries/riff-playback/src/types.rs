//! Core configuration

use crate::history::DEFAULT_RECENT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100)
    pub volume: u8,

    /// Show subtitles / synced lyric lines
    pub subtitles: bool,

    /// Step for fast-forward / rewind, in seconds
    pub seek_step_secs: f64,

    /// How many selections to remember
    pub recent_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            subtitles: true,
            seek_step_secs: 5.0,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}
