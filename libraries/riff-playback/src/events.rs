//! Notification hub
//!
//! Single-subscriber callback slots through which front ends and desktop
//! integrations learn about playback changes without polling.
//!
//! Registering a callback replaces the previous one. Callbacks run
//! synchronously on the thread that detected the change (the engine event
//! thread for time and state updates) and are never invoked while the
//! controller's state lock is held. They must not block.

use riff_core::Track;
use std::sync::{Arc, PoisonError, RwLock};

type Callback = Arc<dyn Fn() + Send + Sync>;
type TimeCallback = Arc<dyn Fn(f64, f64) + Send + Sync>;
type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
type TrackCallback = Arc<dyn Fn(&Track) + Send + Sync>;

/// A pending notification, collected under the state lock and fired after it
/// is released
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    StateChanged,
    TimeUpdate { position: f64, duration: f64 },
    EndOfTrack,
    TrackLoaded(Track),
    Subtitle(String),
    Notice(String),
}

/// Callback registry
#[derive(Default)]
pub struct NotificationHub {
    state_change: RwLock<Option<Callback>>,
    time_update: RwLock<Option<TimeCallback>>,
    end_of_track: RwLock<Option<Callback>>,
    track_loaded: RwLock<Option<TrackCallback>>,
    subtitle_change: RwLock<Option<TextCallback>>,
    notice: RwLock<Option<TextCallback>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback state changed (load, pause, resume, stop, track change)
    pub fn on_state_change(&self, cb: impl Fn() + Send + Sync + 'static) {
        set_slot(&self.state_change, Arc::new(cb));
    }

    /// Position/duration update, in seconds
    pub fn on_time_update(&self, cb: impl Fn(f64, f64) + Send + Sync + 'static) {
        set_slot(&self.time_update, Arc::new(cb));
    }

    /// The current track reached its natural end
    pub fn on_end_of_track(&self, cb: impl Fn() + Send + Sync + 'static) {
        set_slot(&self.end_of_track, Arc::new(cb));
    }

    /// The engine finished opening the current track
    pub fn on_track_loaded(&self, cb: impl Fn(&Track) + Send + Sync + 'static) {
        set_slot(&self.track_loaded, Arc::new(cb));
    }

    /// Subtitle or synced lyric line changed (empty string when cleared)
    pub fn on_subtitle_change(&self, cb: impl Fn(&str) + Send + Sync + 'static) {
        set_slot(&self.subtitle_change, Arc::new(cb));
    }

    /// Short user-visible failure message
    pub fn on_notice(&self, cb: impl Fn(&str) + Send + Sync + 'static) {
        set_slot(&self.notice, Arc::new(cb));
    }

    pub(crate) fn dispatch(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification {
                Notification::StateChanged => {
                    if let Some(cb) = get_slot(&self.state_change) {
                        cb();
                    }
                }
                Notification::TimeUpdate { position, duration } => {
                    if let Some(cb) = get_slot(&self.time_update) {
                        cb(position, duration);
                    }
                }
                Notification::EndOfTrack => {
                    if let Some(cb) = get_slot(&self.end_of_track) {
                        cb();
                    }
                }
                Notification::TrackLoaded(track) => {
                    if let Some(cb) = get_slot(&self.track_loaded) {
                        cb(&track);
                    }
                }
                Notification::Subtitle(text) => {
                    if let Some(cb) = get_slot(&self.subtitle_change) {
                        cb(&text);
                    }
                }
                Notification::Notice(text) => {
                    if let Some(cb) = get_slot(&self.notice) {
                        cb(&text);
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub").finish_non_exhaustive()
    }
}

fn set_slot<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>, cb: Arc<T>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(cb);
}

// Clone the callback out so the slot lock is released before it runs.
fn get_slot<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}
