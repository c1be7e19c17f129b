//! Controller behaviour through the public API, against a recording engine

mod common;

use common::{eventually, track, Command, Harness};
use riff_playback::{EndReason, EngineEvent, Lyrics, PlaybackConfig, SelectionState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn urls(h: &Harness) -> Vec<String> {
    h.controller.playlist().into_iter().map(|t| t.url).collect()
}

/// Select t1, continuation [u2, u3] delivered
fn scenario_one() -> Harness {
    let h = Harness::new();
    let ticket = h.controller.select(&track("t1", "u1"));
    assert!(ticket.is_some());
    assert!(h
        .fetcher
        .deliver("u1", vec![track("t2", "u2"), track("t3", "u3")]));
    h
}

// ===== End-to-end scenarios =====

#[test]
fn select_with_continuation_builds_sequence() {
    let h = scenario_one();

    assert_eq!(urls(&h), vec!["u1", "u2", "u3"]);
    assert_eq!(h.controller.playlist_index(), Some(0));
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.selection_state(), SelectionState::Active);

    let current = h.controller.current_track().unwrap();
    assert_eq!(current.name, "Name u1");
    assert_eq!(current.artist, "Artist u1");

    // The head was already playing, so the continuation does not reload it.
    assert_eq!(h.engine.loads(), vec!["u1"]);
}

#[test]
fn end_of_stream_advances_to_next_track() {
    let h = scenario_one();

    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::EndOfFile(EndReason::Eof));

    eventually(|| h.controller.playlist_index() == Some(1));
    assert_eq!(h.engine.loads(), vec!["u1", "u2"]);
    assert_eq!(h.controller.current_track().unwrap().url, "u2");
    assert!(h.controller.is_playing());
}

#[test]
fn stop_resets_session_and_unsets_index() {
    let h = scenario_one();
    h.controller.pause();

    h.controller.stop();

    let session = h.controller.session();
    assert!(!session.is_loaded());
    assert!(!session.is_playing());
    assert!(!session.is_paused());
    assert_eq!(session.current_url(), "");
    assert_eq!(h.controller.playlist_index(), None);

    h.engine.clear();
    h.controller.advance_selection();
    assert!(h.engine.loads().is_empty());
    assert_eq!(h.controller.playlist_index(), None);
}

#[test]
fn rapid_next_wraps_modulo_length() {
    let h = scenario_one();

    for _ in 0..4 {
        h.controller.advance_selection();
    }

    assert_eq!(h.controller.playlist_index(), Some(1));
    assert_eq!(h.engine.loads(), vec!["u1", "u2", "u3", "u1", "u2"]);
    assert_eq!(h.controller.current_track().unwrap().url, "u2");
}

#[test]
fn previous_from_head_wraps_to_tail() {
    let h = scenario_one();

    h.controller.retreat_selection();

    assert_eq!(h.controller.playlist_index(), Some(2));
    assert_eq!(h.engine.loads().last().unwrap(), "u3");
}

// ===== Staleness =====

#[test]
fn stale_continuation_is_discarded() {
    let h = Harness::new();
    h.controller.select(&track("a", "ua"));
    h.controller.select(&track("b", "ub"));

    assert!(!h.fetcher.deliver("ua", vec![track("x", "ux")]));

    assert_eq!(urls(&h), vec!["ub"]);
    assert_eq!(h.controller.playlist_index(), Some(0));
    assert_eq!(h.controller.current_track().unwrap().url, "ub");
    assert_eq!(h.controller.selection_state(), SelectionState::Selecting);
    assert_eq!(h.engine.loads(), vec!["ua", "ub"]);

    assert!(h.fetcher.deliver("ub", vec![track("c", "uc")]));
    assert_eq!(urls(&h), vec!["ub", "uc"]);
}

#[test]
fn continuation_after_stop_is_discarded() {
    let h = Harness::new();
    h.controller.select(&track("a", "ua"));
    h.controller.stop();

    assert!(!h.fetcher.deliver("ua", vec![track("x", "ux")]));
    assert_eq!(h.controller.playlist_index(), None);
    assert!(!h.controller.is_playing());
}

#[test]
fn external_playlist_supersedes_pending_selection() {
    let h = Harness::new();
    h.controller.select(&track("a", "ua"));

    assert!(h
        .controller
        .replace_and_play(vec![track("f1", "f1"), track("f2", "f2")]));
    assert!(!h.fetcher.deliver("ua", vec![track("x", "ux")]));

    assert_eq!(urls(&h), vec!["f1", "f2"]);
}

#[test]
fn continuation_reloads_when_head_no_longer_playing() {
    let h = Harness::new();
    h.controller.select(&track("a", "ua"));
    h.controller.play_url("elsewhere");

    assert!(h.fetcher.deliver("ua", vec![track("b", "ub")]));

    assert_eq!(h.engine.loads(), vec!["ua", "elsewhere", "ua"]);
    assert_eq!(h.controller.playlist_index(), Some(0));
}

#[test]
fn track_without_id_skips_fetch() {
    let h = Harness::new();
    let ticket = h.controller.select(&track("", "radio"));

    assert!(ticket.is_none());
    assert_eq!(h.fetcher.pending(), 0);
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.selection_state(), SelectionState::Active);
}

#[test]
fn select_result_out_of_range_is_noop() {
    let h = Harness::new();
    h.controller
        .set_search_results(vec![track("a", "ua"), track("b", "ub")]);

    assert!(h.controller.select_result(5).is_none());
    assert!(h.engine.loads().is_empty());

    assert!(h.controller.select_result(1).is_some());
    assert_eq!(h.engine.loads(), vec!["ub"]);
}

// ===== Transport =====

#[test]
fn play_same_url_twice_is_idempotent() {
    let h = Harness::new();
    h.controller.play_url("u1");
    let before = h.controller.session();

    h.controller.play_url("u1");

    assert_eq!(h.controller.session(), before);
    assert_eq!(h.engine.commands(), vec![Command::Load("u1".into())]);
}

#[test]
fn play_same_url_while_paused_unpauses() {
    let h = Harness::new();
    h.controller.play_url("u1");
    h.controller.pause();
    assert!(h.controller.is_paused());

    h.controller.play_url("u1");

    assert!(h.controller.is_playing());
    assert_eq!(
        h.engine.commands(),
        vec![
            Command::Load("u1".into()),
            Command::CyclePause,
            Command::CyclePause
        ]
    );
}

#[test]
fn pause_then_resume_restores_playing() {
    let h = Harness::new();

    // Nothing loaded: both are no-ops.
    h.controller.pause();
    h.controller.resume();
    assert!(!h.controller.is_playing());
    assert!(h.engine.commands().is_empty());

    h.controller.play_url("u1");
    h.controller.pause();
    assert!(!h.controller.is_playing());
    h.controller.resume();
    assert!(h.controller.is_playing());
}

#[test]
fn resume_when_not_paused_sends_nothing() {
    let h = Harness::new();
    h.controller.play_url("u1");
    h.engine.clear();

    h.controller.resume();

    assert!(h.engine.commands().is_empty());
}

#[test]
fn toggle_cycles_even_when_not_loaded() {
    let h = Harness::new();

    h.controller.toggle_play_pause();

    assert_eq!(h.engine.commands(), vec![Command::CyclePause]);
    assert!(!h.controller.is_paused());

    h.controller.play_url("u1");
    h.controller.toggle_play_pause();
    assert!(h.controller.is_paused());
    h.controller.toggle_play_pause();
    assert!(h.controller.is_playing());
}

#[test]
fn volume_is_clamped() {
    let h = Harness::new();

    assert_eq!(h.controller.set_volume(-5), 0);
    assert_eq!(h.controller.volume(), 0);
    assert_eq!(h.controller.set_volume(500), 100);
    assert_eq!(h.controller.volume(), 100);
    assert_eq!(
        h.engine.commands(),
        vec![Command::SetVolume(0), Command::SetVolume(100)]
    );
}

#[test]
fn initial_volume_comes_from_config() {
    let h = Harness::with_config(PlaybackConfig {
        volume: 35,
        ..PlaybackConfig::default()
    });
    assert_eq!(h.controller.volume(), 35);
}

#[test]
fn seeks_only_when_loaded() {
    let h = Harness::with_config(PlaybackConfig {
        seek_step_secs: 10.0,
        ..PlaybackConfig::default()
    });
    h.controller.seek(30.0);
    assert!(h.engine.commands().is_empty());

    h.controller.play_url("u1");
    h.controller.seek(30.0);
    h.controller.fast_forward();
    h.controller.rewind();

    assert_eq!(
        h.engine.commands()[1..],
        [
            Command::SeekAbsolute(30.0),
            Command::SeekRelative(10.0),
            Command::SeekRelative(-10.0)
        ]
    );
}

// ===== Sequences =====

#[test]
fn empty_replace_changes_nothing() {
    let h = scenario_one();

    assert!(!h.controller.replace_and_play(Vec::new()));

    assert_eq!(urls(&h), vec!["u1", "u2", "u3"]);
    assert_eq!(h.controller.playlist_index(), Some(0));
    assert_eq!(h.engine.loads(), vec!["u1"]);
}

#[test]
fn failed_first_load_rolls_back() {
    let h = Harness::new();
    let notices = Arc::new(Mutex::new(Vec::new()));
    let n = Arc::clone(&notices);
    h.controller
        .notifications()
        .on_notice(move |text| n.lock().unwrap().push(text.to_string()));
    h.engine.fail_loads(true);

    assert!(!h.controller.replace_and_play(vec![track("a", "ua")]));

    assert!(!h.controller.is_playing());
    assert_eq!(h.controller.playlist_index(), None);
    assert!(h.controller.current_track().is_none());
    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Failed to load first track"));
}

#[test]
fn recovers_after_failed_load() {
    let h = Harness::new();
    h.engine.fail_loads(true);
    h.controller.replace_and_play(vec![track("a", "ua")]);
    h.engine.fail_loads(false);

    assert!(h.controller.replace_and_play(vec![track("b", "ub")]));
    assert!(h.controller.is_playing());
}

#[test]
fn engine_error_before_file_loaded_rolls_back() {
    let h = Harness::new();
    h.controller
        .replace_and_play(vec![track("a", "ua"), track("b", "ub")]);

    h.emit(EngineEvent::EndOfFile(EndReason::Error("unreachable".into())));

    eventually(|| !h.controller.is_playing());
    assert_eq!(h.controller.playlist_index(), None);
}

#[test]
fn engine_error_mid_playlist_keeps_position() {
    let h = Harness::new();
    h.controller
        .replace_and_play(vec![track("a", "ua"), track("b", "ub")]);
    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::EndOfFile(EndReason::Error("decoder".into())));

    eventually(|| !h.controller.is_playing());
    assert_eq!(h.controller.playlist_index(), Some(0));

    h.controller.advance_selection();
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.playlist_index(), Some(1));
}

#[test]
fn end_of_single_url_goes_idle() {
    let h = Harness::new();
    h.controller.play_url("u1");

    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::EndOfFile(EndReason::Eof));

    eventually(|| !h.controller.session().is_loaded());
    assert_eq!(h.engine.loads(), vec!["u1"]);
}

#[test]
fn replaced_file_end_is_ignored() {
    let h = scenario_one();

    h.emit(EngineEvent::EndOfFile(EndReason::Stop));
    h.emit(EngineEvent::PositionChanged(3.0));

    eventually(|| h.controller.position() == 3.0);
    assert_eq!(h.controller.playlist_index(), Some(0));
    assert_eq!(h.engine.loads(), vec!["u1"]);
}

#[test]
fn end_of_skipped_file_does_not_advance_again() {
    let h = scenario_one();
    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::PositionChanged(0.5));
    eventually(|| h.controller.position() == 0.5);

    // u1 ends while the user is already moving on to u2
    h.controller.advance_selection();
    h.emit(EngineEvent::EndOfFile(EndReason::Eof));
    h.emit(EngineEvent::PositionChanged(1.0));

    eventually(|| h.controller.position() == 1.0);
    assert_eq!(h.controller.playlist_index(), Some(1));
    assert_eq!(h.engine.loads(), vec!["u1", "u2"]);
    assert_eq!(h.controller.current_track().unwrap().url, "u2");

    // Once u2 is loaded its own end advances normally
    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::EndOfFile(EndReason::Eof));

    eventually(|| h.controller.playlist_index() == Some(2));
    assert_eq!(h.engine.loads(), vec!["u1", "u2", "u3"]);
}

#[test]
fn file_loaded_reports_current_track() {
    let h = scenario_one();
    let loaded = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&loaded);
    h.controller
        .notifications()
        .on_track_loaded(move |track| l.lock().unwrap().push(track.url.clone()));

    h.emit(EngineEvent::FileLoaded);
    eventually(|| loaded.lock().unwrap().len() == 1);
    h.controller.advance_selection();
    h.emit(EngineEvent::FileLoaded);

    eventually(|| loaded.lock().unwrap().len() == 2);
    assert_eq!(*loaded.lock().unwrap(), vec!["u1", "u2"]);
}

#[test]
fn play_playlist_restarts_after_stop() {
    let h = scenario_one();
    h.controller.advance_selection();
    h.controller.stop();

    h.controller.play_playlist();

    assert_eq!(h.controller.playlist_index(), Some(0));
    assert_eq!(h.engine.loads().last().unwrap(), "u1");
    assert!(h.controller.is_playing());
}

#[test]
fn shuffle_restarts_from_new_head() {
    let h = scenario_one();
    h.engine.clear();

    assert!(h.controller.shuffle());

    let head = h.controller.playlist()[0].url.clone();
    assert_eq!(h.controller.playlist_index(), Some(0));
    assert_eq!(h.engine.loads(), vec![head.clone()]);
    assert_eq!(h.controller.current_track().unwrap().url, head);
}

#[test]
fn shuffle_single_track_does_nothing() {
    let h = Harness::new();
    h.controller.select(&track("", "radio"));
    h.engine.clear();

    assert!(!h.controller.shuffle());
    assert!(h.engine.commands().is_empty());
}

#[test]
fn recently_played_tracks_selections() {
    let h = Harness::new();
    h.controller.select(&track("a", "ua"));
    h.controller.select(&track("b", "ub"));
    h.controller.select(&track("a", "ua"));

    let recent: Vec<_> = h
        .controller
        .recently_played()
        .into_iter()
        .map(|t| t.url)
        .collect();
    assert_eq!(recent, vec!["ua", "ub"]);
}

// ===== Engine events and notifications =====

#[test]
fn engine_reports_drive_session() {
    let h = Harness::new();
    let times = Arc::new(Mutex::new(Vec::new()));
    let t = Arc::clone(&times);
    h.controller
        .notifications()
        .on_time_update(move |pos, dur| t.lock().unwrap().push((pos, dur)));

    h.controller.play_url("u1");
    h.emit(EngineEvent::DurationChanged(200.0));
    h.emit(EngineEvent::PositionChanged(12.0));
    h.emit(EngineEvent::VolumeChanged(42.4));
    h.emit(EngineEvent::PauseChanged(true));

    eventually(|| h.controller.is_paused());
    assert_eq!(h.controller.position(), 12.0);
    assert_eq!(h.controller.duration(), 200.0);
    assert_eq!(h.controller.volume(), 42);
    assert_eq!(*times.lock().unwrap(), vec![(12.0, 200.0)]);
}

#[test]
fn end_of_track_callback_may_query_controller() {
    let h = scenario_one();
    let ends = Arc::new(AtomicUsize::new(0));
    let e = Arc::clone(&ends);
    let controller = h.controller.clone();
    h.controller.notifications().on_end_of_track(move || {
        let _ = controller.is_playing();
        e.fetch_add(1, Ordering::SeqCst);
    });

    h.emit(EngineEvent::FileLoaded);
    h.emit(EngineEvent::EndOfFile(EndReason::Eof));

    eventually(|| ends.load(Ordering::SeqCst) == 1);
}

#[test]
fn state_change_fires_on_transport() {
    let h = Harness::new();
    let changes = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&changes);
    h.controller.notifications().on_state_change(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });

    h.controller.play_url("u1");
    h.controller.pause();
    h.controller.stop();

    assert!(changes.load(Ordering::SeqCst) >= 3);
}

#[test]
fn command_failure_becomes_notice() {
    let h = Harness::new();
    let notices = Arc::new(Mutex::new(Vec::new()));
    let n = Arc::clone(&notices);
    h.controller
        .notifications()
        .on_notice(move |text| n.lock().unwrap().push(text.to_string()));

    h.emit(EngineEvent::CommandFailed {
        command: "seek".into(),
        reason: "property unavailable".into(),
    });

    eventually(|| !notices.lock().unwrap().is_empty());
    assert_eq!(
        notices.lock().unwrap()[0],
        "Engine rejected seek: property unavailable"
    );
}

// ===== Lyrics / subtitles =====

#[test]
fn lyrics_follow_position() {
    let h = Harness::new();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&lines);
    h.controller
        .notifications()
        .on_subtitle_change(move |text| l.lock().unwrap().push(text.to_string()));
    h.controller.play_url("u1");

    let lyrics = Lyrics::parse_lrc("[00:01.00]hello\n[00:04.00]world");
    assert!(!h.controller.set_lyrics("other", lyrics.clone()));
    assert!(h.controller.set_lyrics("u1", lyrics));

    h.emit(EngineEvent::PositionChanged(1.5));
    eventually(|| h.controller.current_subtitle() == "hello");
    h.emit(EngineEvent::PositionChanged(2.0));
    h.emit(EngineEvent::PositionChanged(4.5));
    eventually(|| h.controller.current_subtitle() == "world");

    assert_eq!(*lines.lock().unwrap(), vec!["hello", "world"]);
}

#[test]
fn loading_new_track_clears_lyrics() {
    let h = Harness::new();
    h.controller.play_url("u1");
    h.controller
        .set_lyrics("u1", Lyrics::parse_lrc("[00:00.00]first"));
    assert_eq!(h.controller.current_subtitle(), "first");

    h.controller.play_url("u2");

    assert_eq!(h.controller.current_subtitle(), "");
    h.emit(EngineEvent::PositionChanged(1.0));
    h.emit(EngineEvent::SubtitleChanged(Some("embedded".into())));
    eventually(|| h.controller.current_subtitle() == "embedded");
}

#[test]
fn disabled_subtitles_stay_blank() {
    let h = Harness::new();
    h.controller.play_url("u1");

    assert!(!h.controller.toggle_subtitles());
    h.emit(EngineEvent::SubtitleChanged(Some("ignored".into())));
    h.emit(EngineEvent::PositionChanged(1.0));
    eventually(|| h.controller.position() == 1.0);
    assert_eq!(h.controller.current_subtitle(), "");

    assert!(h.controller.toggle_subtitles());
    assert!(h.controller.subtitles_enabled());
}
