//! Track providers and lyrics lookup for Riff.
//!
//! - [`SaavnClient`]: JioSaavn search and "up next" recommendations,
//!   implementing [`riff_core::TrackProvider`]
//! - [`LrclibClient`]: synced lyrics from LRCLIB

#![forbid(unsafe_code)]

pub mod error;
mod http;
pub mod lrclib;
pub mod saavn;

pub use error::{Result, SourceError};
pub use lrclib::{LrclibClient, LyricsText, DEFAULT_LRCLIB_URL};
pub use saavn::{SaavnClient, DEFAULT_SAAVN_URL};
