/// Core traits for Riff
use crate::error::Result;
use crate::types::{Track, TrackSource};
use async_trait::async_trait;

/// A backend that can find tracks and suggest what plays next
///
/// One implementation per streaming service. The `source` tag on each
/// returned [`Track`] must equal [`TrackProvider::source`], so the playback
/// core can route continuation lookups back to the right provider.
#[async_trait]
pub trait TrackProvider: Send + Sync {
    /// Backend this provider serves
    fn source(&self) -> TrackSource;

    /// Search the backend
    ///
    /// # Errors
    /// Returns an error if the request fails or the response cannot be parsed
    async fn search(&self, query: &str) -> Result<Vec<Track>>;

    /// Fetch the "related / next" tracks for a selected track
    ///
    /// May return an empty list.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response cannot be parsed
    async fn fetch_continuation(&self, track: &Track) -> Result<Vec<Track>>;
}
