//! Riff - terminal music player front end
//!
//! Wires the playback core to mpv, the JioSaavn provider and LRCLIB, and
//! drives it from a line-oriented command loop.

pub mod app;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod lyrics;
pub mod notifier;
pub mod storage;
