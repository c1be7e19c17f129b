//! Riff Core
//!
//! Shared track types, provider traits, and error handling for Riff.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track` and its originating `TrackSource`
//! - **Core Traits**: `TrackProvider` (search + continuation lookup)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use riff_core::{Track, TrackSource};
//!
//! let track = Track::new("Bones", "Imagine Dragons", "https://example.com/bones", TrackSource::Saavn)
//!     .with_id("abc123");
//!
//! assert_eq!(track.display_label(), "Bones - Imagine Dragons");
//! assert!(track.has_continuation());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use traits::TrackProvider;
pub use types::{Track, TrackSource};
