//! Error types for playback orchestration

use thiserror::Error;

/// Failures reported by a [`MediaEngine`](crate::MediaEngine)
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started or connected to
    #[error("Failed to start media engine: {0}")]
    Spawn(String),

    /// The engine went away
    #[error("Media engine disconnected")]
    Disconnected,

    /// The engine refused a command
    #[error("Command '{command}' failed: {reason}")]
    Command {
        /// Command name as sent to the engine
        command: String,
        /// Engine-supplied reason
        reason: String,
    },

    /// IO error talking to the engine
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Tried to install an empty track sequence
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// A single-flight operation is already running
    #[error("{0} already in progress")]
    AlreadyInProgress(&'static str),

    /// IO error (event thread spawn)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
