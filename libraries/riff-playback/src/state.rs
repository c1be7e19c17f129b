//! Controller state machine
//!
//! Everything the controller guards with its single mutex. Methods here run
//! with the lock held: they may issue engine commands (fire-and-forget) but
//! only *collect* notifications, which the controller fires after unlocking.

use crate::engine::{EndReason, EngineEvent, MediaEngine};
use crate::events::Notification;
use crate::lyrics::Lyrics;
use crate::playlist::PlaylistManager;
use crate::reconciler::{SelectionTicket, TrackListReconciler};
use crate::session::PlaybackSession;
use crate::types::PlaybackConfig;
use riff_core::Track;
use std::fmt::Display;
use tracing::{debug, info, warn};

type Out = Vec<Notification>;

pub(crate) struct CoreState {
    pub(crate) session: PlaybackSession,
    pub(crate) playlist: PlaylistManager,
    pub(crate) reconciler: TrackListReconciler,
    pub(crate) current: Option<Track>,
    pub(crate) subtitle: String,
    pub(crate) subtitles_enabled: bool,
    lyrics: Option<Lyrics>,
    seek_step: f64,
    /// Set between loading the head of a new sequence and the engine
    /// confirming it; a failure in that window rolls the session back.
    awaiting_first_load: bool,
    /// Set from a load until the engine reports the file as loaded. An
    /// end-of-file seen in that window belongs to the replaced file.
    load_pending: bool,
}

impl CoreState {
    pub(crate) fn new(config: &PlaybackConfig) -> Self {
        Self {
            session: PlaybackSession::new(config.volume),
            playlist: PlaylistManager::new(),
            reconciler: TrackListReconciler::new(config.recent_capacity),
            current: None,
            subtitle: String::new(),
            subtitles_enabled: config.subtitles,
            lyrics: None,
            seek_step: config.seek_step_secs,
            awaiting_first_load: false,
            load_pending: false,
        }
    }

    // ===== Transport =====

    pub(crate) fn play_url(&mut self, engine: &dyn MediaEngine, url: &str, out: &mut Out) {
        if url.is_empty() {
            warn!("Ignoring play request without a URL");
            return;
        }

        if url != self.session.current_url() {
            if let Err(err) = self.load(engine, url, out) {
                report(out, "Failed to load track", err);
            }
            return;
        }

        if self.session.is_paused() {
            match engine.cycle_pause() {
                Ok(()) => self.session.set_paused(false),
                Err(err) => report(out, "Failed to resume", err),
            }
        } else {
            debug!(url = %url, "Already playing");
        }
        out.push(Notification::StateChanged);
    }

    pub(crate) fn play_track(&mut self, engine: &dyn MediaEngine, track: &Track, out: &mut Out) {
        self.current = Some(track.clone());
        self.play_url(engine, &track.url, out);
    }

    pub(crate) fn pause(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        if !self.session.is_loaded() {
            debug!("Pause ignored, nothing loaded");
            return;
        }

        match engine.cycle_pause() {
            Ok(()) => {
                self.session.toggle_paused();
                out.push(Notification::StateChanged);
            }
            Err(err) => report(out, "Failed to pause", err),
        }
    }

    pub(crate) fn resume(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        if !self.session.is_paused() {
            return;
        }

        match engine.cycle_pause() {
            Ok(()) => {
                self.session.set_paused(false);
                out.push(Notification::StateChanged);
            }
            Err(err) => report(out, "Failed to resume", err),
        }
    }

    pub(crate) fn toggle_play_pause(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        match engine.cycle_pause() {
            Ok(()) => {
                self.session.toggle_paused();
                out.push(Notification::StateChanged);
            }
            Err(err) => report(out, "Failed to toggle pause", err),
        }
    }

    pub(crate) fn stop(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        if let Err(err) = engine.stop() {
            report(out, "Failed to stop", err);
        }

        self.session.reset();
        self.playlist.invalidate();
        self.reconciler.abandon();
        self.current = None;
        self.lyrics = None;
        self.awaiting_first_load = false;
        self.load_pending = false;
        self.set_subtitle(String::new(), out);
        out.push(Notification::StateChanged);
    }

    pub(crate) fn seek(&mut self, engine: &dyn MediaEngine, seconds: f64, out: &mut Out) {
        if !self.session.is_loaded() {
            debug!("Seek ignored, nothing loaded");
            return;
        }
        if let Err(err) = engine.seek_absolute(seconds) {
            report(out, "Failed to seek", err);
        }
    }

    pub(crate) fn seek_relative(&mut self, engine: &dyn MediaEngine, delta: f64, out: &mut Out) {
        if !self.session.is_loaded() {
            debug!("Seek ignored, nothing loaded");
            return;
        }
        if let Err(err) = engine.seek_relative(delta) {
            report(out, "Failed to seek", err);
        }
    }

    pub(crate) fn seek_step(&self) -> f64 {
        self.seek_step
    }

    pub(crate) fn set_volume(&mut self, engine: &dyn MediaEngine, volume: i32, out: &mut Out) -> u8 {
        let volume = volume.clamp(0, 100) as u8;
        match engine.set_volume(volume) {
            Ok(()) => {
                self.session.set_volume(volume);
                out.push(Notification::StateChanged);
            }
            Err(err) => report(out, "Failed to set volume", err),
        }
        self.session.volume()
    }

    // ===== Sequences =====

    pub(crate) fn replace_and_play(
        &mut self,
        engine: &dyn MediaEngine,
        tracks: Vec<Track>,
        out: &mut Out,
    ) -> bool {
        let head = match self.playlist.replace_and_play(tracks) {
            Ok(head) => head.clone(),
            Err(_) => return false,
        };

        self.start_sequence(engine, head, out)
    }

    pub(crate) fn select(
        &mut self,
        engine: &dyn MediaEngine,
        track: &Track,
        out: &mut Out,
    ) -> Option<SelectionTicket> {
        let ticket = self.reconciler.begin_selection(track);
        info!(track = %track.display_label(), source = %track.source, "Selected track");

        // Single-track context until the continuation arrives.
        if self.playlist.replace_and_play(vec![track.clone()]).is_err() {
            return None;
        }

        if self.start_sequence(engine, track.clone(), out) {
            ticket
        } else {
            self.reconciler.abandon();
            None
        }
    }

    pub(crate) fn accept_continuation(
        &mut self,
        engine: &dyn MediaEngine,
        ticket: &SelectionTicket,
        continuation: Vec<Track>,
        out: &mut Out,
    ) -> bool {
        let Some(sequence) = self.reconciler.accept_continuation(ticket, continuation) else {
            return false;
        };

        info!(
            track = %ticket.track().display_label(),
            tracks = sequence.len(),
            "Installing continuation"
        );

        let head_playing =
            self.session.is_loaded() && self.session.current_url() == sequence[0].url;
        if !head_playing {
            return self.replace_and_play(engine, sequence, out);
        }

        match self.playlist.install(sequence) {
            Ok(()) => {
                self.current = self.playlist.current_track().cloned();
                out.push(Notification::StateChanged);
                true
            }
            Err(err) => {
                warn!(error = %err, "Continuation install failed");
                false
            }
        }
    }

    pub(crate) fn advance(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        match self.playlist.advance().cloned() {
            Some(track) => self.start_track(engine, track, out),
            None => debug!("Advance ignored, no active playlist"),
        }
    }

    pub(crate) fn retreat(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        match self.playlist.retreat().cloned() {
            Some(track) => self.start_track(engine, track, out),
            None => debug!("Retreat ignored, no active playlist"),
        }
    }

    pub(crate) fn play_playlist(&mut self, engine: &dyn MediaEngine, out: &mut Out) {
        match self.playlist.restart().cloned() {
            Some(head) => {
                self.start_sequence(engine, head, out);
            }
            None => warn!("Play playlist ignored, playlist is empty"),
        }
    }

    /// Shuffle; restarts from the new head when something is playing
    pub(crate) fn shuffle(&mut self, engine: &dyn MediaEngine, out: &mut Out) -> bool {
        if !self.playlist.shuffle() {
            return false;
        }

        match self.playlist.current_track().cloned() {
            Some(head) if self.session.is_loaded() => self.start_track(engine, head, out),
            _ => out.push(Notification::StateChanged),
        }
        true
    }

    fn start_sequence(&mut self, engine: &dyn MediaEngine, head: Track, out: &mut Out) -> bool {
        self.current = Some(head.clone());
        match self.load(engine, &head.url, out) {
            Ok(()) => {
                self.awaiting_first_load = true;
                true
            }
            Err(err) => {
                self.rollback_failed_start(err, out);
                false
            }
        }
    }

    fn start_track(&mut self, engine: &dyn MediaEngine, track: Track, out: &mut Out) {
        let url = track.url.clone();
        self.current = Some(track);
        if let Err(err) = self.load(engine, &url, out) {
            report(out, "Failed to load track", err);
            self.session.reset();
            out.push(Notification::StateChanged);
        }
    }

    fn load(
        &mut self,
        engine: &dyn MediaEngine,
        url: &str,
        out: &mut Out,
    ) -> Result<(), crate::error::EngineError> {
        engine.load(url)?;
        debug!(url = %url, "Loaded");

        self.session.begin(url);
        self.load_pending = true;
        self.lyrics = None;
        self.set_subtitle(String::new(), out);
        out.push(Notification::StateChanged);
        Ok(())
    }

    fn rollback_failed_start(&mut self, reason: impl Display, out: &mut Out) {
        report(out, "Failed to load first track", reason);
        self.session.reset();
        self.playlist.invalidate();
        self.current = None;
        self.awaiting_first_load = false;
        self.load_pending = false;
        out.push(Notification::StateChanged);
    }

    // ===== Lyrics / subtitles =====

    pub(crate) fn set_lyrics(&mut self, url: &str, lyrics: Lyrics, out: &mut Out) -> bool {
        if !self.session.is_loaded() || self.session.current_url() != url {
            debug!(url = %url, "Discarding lyrics for a track that is no longer loaded");
            return false;
        }

        self.lyrics = Some(lyrics);
        self.refresh_lyric_line(out);
        true
    }

    pub(crate) fn toggle_subtitles(&mut self, out: &mut Out) -> bool {
        self.subtitles_enabled = !self.subtitles_enabled;
        if self.subtitles_enabled {
            self.refresh_lyric_line(out);
        } else {
            self.set_subtitle(String::new(), out);
        }
        self.subtitles_enabled
    }

    fn refresh_lyric_line(&mut self, out: &mut Out) {
        if !self.subtitles_enabled {
            return;
        }
        let Some(lyrics) = &self.lyrics else { return };

        let line = lyrics
            .line_at(self.session.position())
            .unwrap_or_default()
            .to_string();
        self.set_subtitle(line, out);
    }

    fn set_subtitle(&mut self, text: String, out: &mut Out) {
        if text != self.subtitle {
            self.subtitle.clone_from(&text);
            out.push(Notification::Subtitle(text));
        }
    }

    // ===== Engine events =====

    pub(crate) fn apply_event(&mut self, engine: &dyn MediaEngine, event: EngineEvent, out: &mut Out) {
        match event {
            EngineEvent::FileLoaded => {
                self.awaiting_first_load = false;
                self.load_pending = false;
                out.push(Notification::StateChanged);
                if let Some(track) = &self.current {
                    out.push(Notification::TrackLoaded(track.clone()));
                }
            }
            EngineEvent::EndOfFile(EndReason::Eof) if self.load_pending => {
                debug!("Ignoring end of a replaced file");
            }
            EngineEvent::EndOfFile(EndReason::Eof) => {
                out.push(Notification::EndOfTrack);
                if self.playlist.current_index().is_some() {
                    self.advance(engine, out);
                } else {
                    self.session.reset();
                    self.current = None;
                    self.set_subtitle(String::new(), out);
                    out.push(Notification::StateChanged);
                }
            }
            EngineEvent::EndOfFile(EndReason::Error(reason)) => {
                if self.awaiting_first_load {
                    self.rollback_failed_start(reason, out);
                } else {
                    report(out, "Failed to play track", reason);
                    self.session.reset();
                    out.push(Notification::StateChanged);
                }
            }
            EngineEvent::EndOfFile(reason) => {
                debug!(reason = ?reason, "Playback ended");
            }
            EngineEvent::PositionChanged(position) => {
                if !self.session.is_loaded() {
                    return;
                }
                self.session.set_position(position);
                out.push(Notification::TimeUpdate {
                    position,
                    duration: self.session.duration(),
                });
                self.refresh_lyric_line(out);
            }
            EngineEvent::DurationChanged(duration) => {
                self.session.set_duration(duration);
            }
            EngineEvent::PauseChanged(paused) => {
                if self.session.is_loaded() && self.session.is_paused() != paused {
                    self.session.set_paused(paused);
                    out.push(Notification::StateChanged);
                }
            }
            EngineEvent::VolumeChanged(volume) => {
                self.session.set_volume(volume.round().clamp(0.0, 100.0) as u8);
            }
            EngineEvent::SubtitleChanged(text) => {
                if self.subtitles_enabled && self.lyrics.is_none() {
                    self.set_subtitle(text.unwrap_or_default(), out);
                }
            }
            EngineEvent::CommandFailed { command, reason } => {
                if self.awaiting_first_load && command == "loadfile" {
                    self.rollback_failed_start(reason, out);
                } else {
                    report(out, &format!("Engine rejected {command}"), reason);
                }
            }
        }
    }
}

fn report(out: &mut Out, what: &str, reason: impl Display) {
    warn!(error = %reason, "{}", what);
    out.push(Notification::Notice(format!("{what}: {reason}")));
}
