/// Synced lyrics from LRCLIB
///
/// The `lyrics` command and the lookup that runs whenever a track finishes
/// loading share one slot, so only one request is in flight at a time.
use crate::error::Result;
use crate::notifier::Notifier;
use riff_core::Track;
use riff_playback::{Lyrics, PlaybackController, SingleFlight};
use riff_sources::{LrclibClient, LyricsText};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a lookup found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsOutcome {
    /// Timed lines; `applied` is false when the track changed meanwhile
    Synced { lines: usize, applied: bool },
    /// Untimed text, shown as is
    Plain(String),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct LyricsService {
    client: LrclibClient,
    flight: SingleFlight,
}

impl LyricsService {
    pub fn new(client: LrclibClient) -> Self {
        Self {
            client,
            flight: SingleFlight::new("Lyrics lookup"),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    /// Look up lyrics for `track` and hand synced ones to `controller`
    ///
    /// Fails with `AlreadyInProgress` while another lookup runs.
    pub async fn load(&self, controller: &PlaybackController, track: &Track) -> Result<LyricsOutcome> {
        let _guard = self.flight.try_begin()?;

        let outcome = match self.client.fetch(&track.artist, &track.name).await? {
            Some(LyricsText::Synced(text)) => {
                let lyrics = Lyrics::parse_lrc(&text);
                let lines = lyrics.lines().len();
                let applied = controller.set_lyrics(&track.url, lyrics);
                LyricsOutcome::Synced { lines, applied }
            }
            Some(LyricsText::Plain(text)) => LyricsOutcome::Plain(text),
            None => LyricsOutcome::NotFound,
        };
        Ok(outcome)
    }

    /// Fetch synced lyrics each time the engine finishes loading a track
    ///
    /// Tracks that load while a lookup is running collapse to the newest one.
    /// Returns `None` outside a tokio runtime.
    pub fn follow(&self, controller: &PlaybackController, notifier: Notifier) -> Option<LyricsWatcher> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime; automatic lyrics disabled");
            return None;
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<Track>();
        controller.notifications().on_track_loaded(move |track| {
            // Closed only once the watcher is gone
            let _ = tx.send(track.clone());
        });

        let service = self.clone();
        let controller = controller.clone();
        let task = handle.spawn(async move {
            while let Some(mut track) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    track = newer;
                }

                match service.load(&controller, &track).await {
                    Ok(LyricsOutcome::Synced { lines, applied: true }) => {
                        info!(url = %track.url, lines, "Lyrics loaded");
                        notifier.notify(&format!("Lyrics loaded for: {}", track.display_label()));
                    }
                    Ok(outcome) => debug!(url = %track.url, ?outcome, "No synced lyrics applied"),
                    Err(e) => debug!(url = %track.url, error = %e, "Automatic lyrics lookup skipped"),
                }
            }
        });

        Some(LyricsWatcher { task })
    }
}

/// Background lookup task; stops when dropped
#[derive(Debug)]
pub struct LyricsWatcher {
    task: JoinHandle<()>,
}

impl Drop for LyricsWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
