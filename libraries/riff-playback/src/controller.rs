//! Playback controller
//!
//! The single source of truth for "what is playing". One mutex guards the
//! session, the playlist and the selection state; the engine event thread and
//! every public method serialize through it. Engine commands are issued with
//! the lock held (they are fire-and-forget writes), notifications are fired
//! after it is released.

use crate::continuation::{ContinuationFetcher, ContinuationSink};
use crate::engine::{EngineEvent, MediaEngine};
use crate::error::Result;
use crate::events::{Notification, NotificationHub};
use crate::lyrics::Lyrics;
use crate::reconciler::{SelectionState, SelectionTicket};
use crate::session::PlaybackSession;
use crate::state::CoreState;
use crate::types::PlaybackConfig;
use crossbeam_channel::Receiver;
use riff_core::Track;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use tracing::{debug, warn};

pub(crate) struct Shared {
    state: Mutex<CoreState>,
    engine: Box<dyn MediaEngine>,
    hub: NotificationHub,
    fetcher: Box<dyn ContinuationFetcher>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut CoreState, &dyn MediaEngine, &mut Vec<Notification>) -> R,
    ) -> R {
        let mut out = Vec::new();
        let result = {
            let mut state = self.lock();
            f(&mut state, self.engine.as_ref(), &mut out)
        };
        self.hub.dispatch(out);
        result
    }
}

/// Cheap to clone; all clones drive the same engine
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    /// Take ownership of `engine` and start consuming its event stream
    ///
    /// The event thread lives until the engine closes its channel.
    pub fn new(
        engine: Box<dyn MediaEngine>,
        events: Receiver<EngineEvent>,
        fetcher: Box<dyn ContinuationFetcher>,
        config: PlaybackConfig,
    ) -> Result<Self> {
        let state = CoreState::new(&config);
        let volume = state.session.volume();

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            engine,
            hub: NotificationHub::new(),
            fetcher,
        });

        if let Err(err) = shared.engine.set_volume(volume) {
            warn!(error = %err, volume, "Failed to apply initial volume");
        }

        spawn_event_thread(Arc::downgrade(&shared), events)?;
        Ok(Self { shared })
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Callback registration
    pub fn notifications(&self) -> &NotificationHub {
        &self.shared.hub
    }

    // ===== Transport =====

    /// Play `url`, loading it only if it is not already the current file
    pub fn play_url(&self, url: &str) {
        self.shared
            .with_state(|state, engine, out| state.play_url(engine, url, out));
    }

    /// Play `track` and remember it as the current track
    pub fn play_track(&self, track: &Track) {
        self.shared
            .with_state(|state, engine, out| state.play_track(engine, track, out));
    }

    /// Flip pause if something is loaded
    pub fn pause(&self) {
        self.shared
            .with_state(|state, engine, out| state.pause(engine, out));
    }

    pub fn resume(&self) {
        self.shared
            .with_state(|state, engine, out| state.resume(engine, out));
    }

    /// One pause-cycle, regardless of loaded state
    pub fn toggle_play_pause(&self) {
        self.shared
            .with_state(|state, engine, out| state.toggle_play_pause(engine, out));
    }

    /// Stop, unset the playlist position and drop any pending selection
    pub fn stop(&self) {
        self.shared
            .with_state(|state, engine, out| state.stop(engine, out));
    }

    /// Absolute seek in seconds; range is the engine's business
    pub fn seek(&self, seconds: f64) {
        self.shared
            .with_state(|state, engine, out| state.seek(engine, seconds, out));
    }

    pub fn seek_relative(&self, delta: f64) {
        self.shared
            .with_state(|state, engine, out| state.seek_relative(engine, delta, out));
    }

    /// Seek forward by the configured step
    pub fn fast_forward(&self) {
        self.shared.with_state(|state, engine, out| {
            let step = state.seek_step();
            state.seek_relative(engine, step, out);
        });
    }

    /// Seek back by the configured step
    pub fn rewind(&self) {
        self.shared.with_state(|state, engine, out| {
            let step = state.seek_step();
            state.seek_relative(engine, -step, out);
        });
    }

    /// Set volume, clamped to 0-100; returns the resulting volume
    pub fn set_volume(&self, volume: i32) -> u8 {
        self.shared
            .with_state(|state, engine, out| state.set_volume(engine, volume, out))
    }

    // ===== Session reads =====

    pub fn position(&self) -> f64 {
        self.shared.lock().session.position()
    }

    pub fn duration(&self) -> f64 {
        self.shared.lock().session.duration()
    }

    pub fn volume(&self) -> u8 {
        self.shared.lock().session.volume()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.lock().session.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().session.is_paused()
    }

    /// Consistent snapshot of the whole session
    pub fn session(&self) -> PlaybackSession {
        self.shared.lock().session.clone()
    }

    /// Track whose metadata should be displayed
    pub fn current_track(&self) -> Option<Track> {
        self.shared.lock().current.clone()
    }

    // ===== Playlist =====

    /// Install an external sequence (favorites, recently played) and play
    /// its first track. Supersedes any pending selection.
    ///
    /// Returns false for an empty list or a failed first load.
    pub fn replace_and_play(&self, tracks: Vec<Track>) -> bool {
        self.shared.with_state(|state, engine, out| {
            if !tracks.is_empty() {
                state.reconciler.supersede();
            }
            state.replace_and_play(engine, tracks, out)
        })
    }

    /// Start the installed playlist from the top
    pub fn play_playlist(&self) {
        self.shared
            .with_state(|state, engine, out| state.play_playlist(engine, out));
    }

    /// Shuffle the playlist; playback restarts from the new first track
    /// when something is loaded
    pub fn shuffle(&self) -> bool {
        self.shared
            .with_state(|state, engine, out| state.shuffle(engine, out))
    }

    pub fn playlist(&self) -> Vec<Track> {
        self.shared.lock().playlist.tracks().to_vec()
    }

    /// `None` when empty or invalidated by `stop`
    pub fn playlist_index(&self) -> Option<usize> {
        self.shared.lock().playlist.current_index()
    }

    // ===== Selection =====

    pub fn set_search_results(&self, results: Vec<Track>) {
        self.shared.lock().reconciler.set_results(results);
    }

    pub fn search_results(&self) -> Vec<Track> {
        self.shared.lock().reconciler.results().to_vec()
    }

    /// Select a track: it starts playing at once and its continuation is
    /// fetched in the background
    ///
    /// Returns the ticket of the started fetch, `None` when the track has no
    /// continuation or failed to load.
    pub fn select(&self, track: &Track) -> Option<SelectionTicket> {
        let ticket = self
            .shared
            .with_state(|state, engine, out| state.select(engine, track, out));

        if let Some(ticket) = &ticket {
            let sink = ContinuationSink::new(Arc::downgrade(&self.shared));
            self.shared.fetcher.request(ticket.clone(), sink);
        }
        ticket
    }

    /// Select the search result at `index`; out of range is a logged no-op
    pub fn select_result(&self, index: usize) -> Option<SelectionTicket> {
        let track = self.shared.lock().reconciler.result(index).cloned();
        match track {
            Some(track) => self.select(&track),
            None => {
                warn!(index, "Selected result index out of range");
                None
            }
        }
    }

    /// Install a fetched continuation if it still belongs to the pending
    /// selection; stale results are dropped
    pub fn on_continuation_ready(&self, ticket: &SelectionTicket, continuation: Vec<Track>) -> bool {
        self.shared.with_state(|state, engine, out| {
            state.accept_continuation(engine, ticket, continuation, out)
        })
    }

    /// Next track (wraps)
    pub fn advance_selection(&self) {
        self.shared
            .with_state(|state, engine, out| state.advance(engine, out));
    }

    /// Previous track (wraps)
    pub fn retreat_selection(&self) {
        self.shared
            .with_state(|state, engine, out| state.retreat(engine, out));
    }

    pub fn selection_state(&self) -> SelectionState {
        self.shared.lock().reconciler.state()
    }

    /// Most recently selected first, deduplicated
    pub fn recently_played(&self) -> Vec<Track> {
        self.shared.lock().reconciler.recently_played()
    }

    /// Seed the recently played list from a persisted snapshot
    pub fn restore_recently_played(&self, tracks: Vec<Track>) {
        self.shared.lock().reconciler.restore_recent(tracks);
    }

    // ===== Lyrics / subtitles =====

    /// Attach synced lyrics to `url`; ignored unless `url` is still loaded
    pub fn set_lyrics(&self, url: &str, lyrics: Lyrics) -> bool {
        self.shared
            .with_state(|state, _, out| state.set_lyrics(url, lyrics, out))
    }

    /// Returns whether subtitles are now enabled
    pub fn toggle_subtitles(&self) -> bool {
        self.shared
            .with_state(|state, _, out| state.toggle_subtitles(out))
    }

    pub fn subtitles_enabled(&self) -> bool {
        self.shared.lock().subtitles_enabled
    }

    pub fn current_subtitle(&self) -> String {
        self.shared.lock().subtitle.clone()
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

fn spawn_event_thread(shared: Weak<Shared>, events: Receiver<EngineEvent>) -> Result<()> {
    thread::Builder::new()
        .name("riff-engine-events".to_string())
        .spawn(move || {
            for event in &events {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.with_state(|state, engine, out| state.apply_event(engine, event, out));
            }
            debug!("Engine event stream closed");
        })?;
    Ok(())
}
