//! mpv media engine for Riff
//!
//! Runs mpv with `--idle` and drives it over its JSON IPC socket.
//! [`MpvEngine`] implements [`riff_playback::MediaEngine`]; property changes
//! and `end-file` / `file-loaded` events come back on a crossbeam channel
//! ready to hand to [`riff_playback::PlaybackController::new`].

#![forbid(unsafe_code)]

#[cfg(unix)]
mod engine;
pub mod protocol;

#[cfg(unix)]
pub use engine::{MpvEngine, MpvOptions};
