//! Media engine seam
//!
//! The controller drives an external decoder/output engine through
//! [`MediaEngine`] and learns what the engine is doing from a stream of
//! [`EngineEvent`]s delivered over a `crossbeam-channel` receiver.
//!
//! Commands are fire-and-forget: a successful return only means the command
//! was handed to the engine. Confirmation arrives later as an event.

use crate::error::EngineError;

/// Why the engine stopped playing a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Reached the end of the stream
    Eof,

    /// Stopped by a command (stop, or a new file replaced it)
    Stop,

    /// Engine is shutting down
    Quit,

    /// Decoding or network failure
    Error(String),

    /// The URL redirected to another entry
    Redirect,
}

impl EndReason {
    /// Parse an engine reason string; unknown reasons map to `Stop`
    pub fn parse(reason: &str, error: Option<&str>) -> Self {
        match reason {
            "eof" => Self::Eof,
            "quit" => Self::Quit,
            "error" => Self::Error(error.unwrap_or("unknown error").to_string()),
            "redirect" => Self::Redirect,
            _ => Self::Stop,
        }
    }
}

/// Asynchronous notifications from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The most recently loaded file is ready and playing
    FileLoaded,

    /// Playback of the current file ended
    EndOfFile(EndReason),

    /// Playback position in seconds
    PositionChanged(f64),

    /// Duration of the current file in seconds
    DurationChanged(f64),

    /// Engine pause flag
    PauseChanged(bool),

    /// Engine volume (0-100)
    VolumeChanged(f64),

    /// Embedded subtitle text (`None` when cleared)
    SubtitleChanged(Option<String>),

    /// A previously issued command was rejected asynchronously
    CommandFailed {
        /// Command name
        command: String,
        /// Engine-supplied reason
        reason: String,
    },
}

/// Command side of a media engine
///
/// Exclusively owned by the playback controller.
pub trait MediaEngine: Send + Sync {
    /// Replace whatever is playing with `url` and start it unpaused
    fn load(&self, url: &str) -> Result<(), EngineError>;

    /// Flip the engine's pause flag
    fn cycle_pause(&self) -> Result<(), EngineError>;

    /// Stop playback and unload the current file
    fn stop(&self) -> Result<(), EngineError>;

    /// Seek to an absolute position in seconds (engine clamps)
    fn seek_absolute(&self, seconds: f64) -> Result<(), EngineError>;

    /// Seek relative to the current position
    fn seek_relative(&self, delta: f64) -> Result<(), EngineError>;

    /// Set output volume, already clamped to 0-100
    fn set_volume(&self, volume: u8) -> Result<(), EngineError>;
}
