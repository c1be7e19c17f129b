/// Front-end error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error(transparent)]
    Playback(#[from] riff_playback::PlaybackError),

    #[error("Lyrics lookup failed: {0}")]
    Lyrics(#[from] riff_sources::SourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
