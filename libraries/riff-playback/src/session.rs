//! Live engine state as tracked by the controller

use serde::Serialize;

/// What the engine is doing right now
///
/// `playing` is never stored: it is always `loaded && !paused`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    current_url: String,
    loaded: bool,
    paused: bool,
    position: f64,
    duration: f64,
    volume: u8,
}

impl PlaybackSession {
    /// Empty session at the given volume
    pub fn new(volume: u8) -> Self {
        Self {
            current_url: String::new(),
            loaded: false,
            paused: false,
            position: 0.0,
            duration: 0.0,
            volume: volume.min(100),
        }
    }

    /// URL of the loaded file, empty when nothing is loaded
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Loaded and not paused
    pub fn is_playing(&self) -> bool {
        self.loaded && !self.paused
    }

    /// Loaded and paused
    pub fn is_paused(&self) -> bool {
        self.loaded && self.paused
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration in seconds, 0 until the engine reports it
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub(crate) fn begin(&mut self, url: &str) {
        self.current_url = url.to_string();
        self.loaded = true;
        self.paused = false;
        self.position = 0.0;
        self.duration = 0.0;
    }

    /// Back to "nothing loaded"; volume survives
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.volume);
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub(crate) fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub(crate) fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_is_derived() {
        let mut session = PlaybackSession::new(80);
        assert!(!session.is_playing());
        assert!(!session.is_paused());

        session.begin("u1");
        assert!(session.is_playing());

        session.set_paused(true);
        assert!(session.is_paused());
        assert!(!session.is_playing());
    }

    #[test]
    fn reset_keeps_volume() {
        let mut session = PlaybackSession::new(40);
        session.begin("u1");
        session.set_position(12.5);
        session.reset();

        assert_eq!(session, PlaybackSession::new(40));
        assert_eq!(session.current_url(), "");
    }
}
