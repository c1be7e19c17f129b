//! Recently played tracking
//!
//! Maintains a bounded, deduplicated list of selected tracks

use riff_core::Track;
use std::collections::VecDeque;

/// Default number of remembered selections
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Most-recently-selected tracks
///
/// Most recent first. Selecting a track that is already present moves it to
/// the front instead of duplicating it (tracks are compared by URL).
#[derive(Debug, Clone)]
pub struct RecentlyPlayed {
    tracks: VecDeque<Track>,
    max_size: usize,
}

impl RecentlyPlayed {
    /// Create an empty list holding at most `max_size` tracks
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a selection
    pub fn push(&mut self, track: Track) {
        if self.max_size == 0 {
            return;
        }

        self.tracks.retain(|t| t.url != track.url);
        self.tracks.push_front(track);
        self.tracks.truncate(self.max_size);
    }

    /// Replace contents with a persisted snapshot (most recent first)
    pub fn restore(&mut self, tracks: Vec<Track>) {
        self.tracks.clear();
        for track in tracks.into_iter().rev() {
            self.push(track);
        }
    }

    /// Snapshot, most recent first
    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Default for RecentlyPlayed {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}
