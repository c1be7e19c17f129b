//! Riff - Playback Orchestration
//!
//! The part of Riff that decides what plays. It owns the playback session,
//! the playlist and the selection state, drives an external media engine, and
//! reconciles engine events, user commands and background continuation
//! fetches into one consistent current-track model.
//!
//! This crate provides:
//! - [`PlaybackController`]: transport commands and the engine event thread
//! - [`PlaylistManager`]: ordered tracks with wraparound navigation
//! - [`TrackListReconciler`]: search results, selections, staleness check
//! - [`NotificationHub`]: callbacks for state, time, track load, end of track, subtitles
//! - [`MediaEngine`]: the seam to the decoder (see `riff-mpv`)
//!
//! # Example
//!
//! ```rust,no_run
//! use riff_playback::{MediaEngine, NoContinuation, PlaybackConfig, PlaybackController};
//! use riff_core::{Track, TrackSource};
//! # fn engine() -> (Box<dyn MediaEngine>, crossbeam_channel::Receiver<riff_playback::EngineEvent>) { unimplemented!() }
//!
//! let (engine, events) = engine();
//! let controller = PlaybackController::new(
//!     engine,
//!     events,
//!     Box::new(NoContinuation),
//!     PlaybackConfig::default(),
//! )?;
//!
//! controller.notifications().on_time_update(|pos, dur| println!("{pos:.0}/{dur:.0}"));
//!
//! let track = Track::new("Song", "Artist", "https://example.com/song.mp3", TrackSource::Saavn);
//! controller.select(&track);
//! controller.set_volume(150); // clamped to 100
//! # Ok::<(), riff_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]

pub mod continuation;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod lyrics;
pub mod playlist;
pub mod reconciler;
pub mod session;
pub mod single_flight;
mod state;
pub mod types;

pub use continuation::{ContinuationFetcher, ContinuationSink, NoContinuation, ProviderContinuations};
pub use controller::PlaybackController;
pub use engine::{EndReason, EngineEvent, MediaEngine};
pub use error::{EngineError, PlaybackError, Result};
pub use events::NotificationHub;
pub use history::RecentlyPlayed;
pub use lyrics::{LyricLine, Lyrics};
pub use playlist::PlaylistManager;
pub use reconciler::{SelectionState, SelectionTicket, TrackListReconciler};
pub use session::PlaybackSession;
pub use single_flight::{FlightGuard, SingleFlight};
pub use types::PlaybackConfig;
