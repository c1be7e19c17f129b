//! Playlist management
//!
//! One ordered list of [`Track`]s plus the current position. The URL
//! sequence handed to the engine is read from the same list, so metadata and
//! engine position cannot drift apart.
//!
//! The manager only decides *which* track should play; the controller issues
//! the actual engine load so session bookkeeping stays in one place.

use crate::error::{PlaybackError, Result};
use rand::seq::SliceRandom;
use rand::thread_rng;
use riff_core::Track;
use tracing::warn;

/// Ordered track sequence with wraparound navigation
#[derive(Debug, Clone, Default)]
pub struct PlaylistManager {
    tracks: Vec<Track>,

    /// `None` means empty / unset
    index: Option<usize>,
}

impl PlaylistManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `tracks` and point at the first one
    ///
    /// Returns the track that must be loaded. An empty list is rejected and
    /// leaves the current sequence untouched.
    pub fn replace_and_play(&mut self, tracks: Vec<Track>) -> Result<&Track> {
        if tracks.is_empty() {
            warn!("Refusing to install an empty playlist");
            return Err(PlaybackError::EmptyPlaylist);
        }

        self.tracks = tracks;
        self.index = Some(0);
        Ok(&self.tracks[0])
    }

    /// Install `tracks` at index 0 without asking for a load
    ///
    /// Used when the head track is already playing.
    pub fn install(&mut self, tracks: Vec<Track>) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }

        self.tracks = tracks;
        self.index = Some(0);
        Ok(())
    }

    /// Step forward with wraparound
    ///
    /// Returns the new current track, or `None` when there is nothing to
    /// advance (empty list or unset index).
    pub fn advance(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        let index = self.index?;
        if len == 0 {
            return None;
        }

        let next = (index + 1) % len;
        self.index = Some(next);
        self.tracks.get(next)
    }

    /// Step back with wraparound
    pub fn retreat(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        let index = self.index?;
        if len == 0 {
            return None;
        }

        let prev = (index + len - 1) % len;
        self.index = Some(prev);
        self.tracks.get(prev)
    }

    /// Restart the sequence from the top (also revives an unset index)
    pub fn restart(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        self.index = Some(0);
        self.tracks.first()
    }

    /// Forget the current position but keep the tracks
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    /// Randomly permute the list and reset to the start
    ///
    /// Does nothing for lists of fewer than two tracks. Never loads.
    /// Returns whether the list was shuffled.
    pub fn shuffle(&mut self) -> bool {
        if self.tracks.len() <= 1 {
            return false;
        }

        self.tracks.shuffle(&mut thread_rng());
        self.index = Some(0);
        true
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Engine-facing URL sequence
    pub fn urls(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.url.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
