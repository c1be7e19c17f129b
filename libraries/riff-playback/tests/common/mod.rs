//! Shared test helpers: a recording engine and a manually driven fetcher

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Sender};
use riff_core::{Track, TrackSource};
use riff_playback::{
    ContinuationFetcher, ContinuationSink, EngineError, EngineEvent, MediaEngine, PlaybackConfig,
    PlaybackController, SelectionTicket,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Command as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    CyclePause,
    Stop,
    SeekAbsolute(f64),
    SeekRelative(f64),
    SetVolume(u8),
}

/// Engine that records every command and can be told to fail loads
#[derive(Clone, Default)]
pub struct RecordingEngine {
    commands: Arc<Mutex<Vec<Command>>>,
    fail_loads: Arc<Mutex<bool>>,
}

impl RecordingEngine {
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    /// URLs passed to `load`, in order
    pub fn loads(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    pub fn fail_loads(&self, fail: bool) {
        *self.fail_loads.lock().unwrap() = fail;
    }

    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

impl MediaEngine for RecordingEngine {
    fn load(&self, url: &str) -> Result<(), EngineError> {
        if *self.fail_loads.lock().unwrap() {
            return Err(EngineError::Disconnected);
        }
        self.record(Command::Load(url.to_string()));
        Ok(())
    }

    fn cycle_pause(&self) -> Result<(), EngineError> {
        self.record(Command::CyclePause);
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.record(Command::Stop);
        Ok(())
    }

    fn seek_absolute(&self, seconds: f64) -> Result<(), EngineError> {
        self.record(Command::SeekAbsolute(seconds));
        Ok(())
    }

    fn seek_relative(&self, delta: f64) -> Result<(), EngineError> {
        self.record(Command::SeekRelative(delta));
        Ok(())
    }

    fn set_volume(&self, volume: u8) -> Result<(), EngineError> {
        self.record(Command::SetVolume(volume));
        Ok(())
    }
}

/// Fetcher that parks requests until the test delivers them
#[derive(Clone, Default)]
pub struct ManualFetcher {
    requests: Arc<Mutex<Vec<(SelectionTicket, ContinuationSink)>>>,
}

impl ManualFetcher {
    pub fn pending(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Deliver the request for the track with `url`
    pub fn deliver(&self, url: &str, continuation: Vec<Track>) -> bool {
        let request = {
            let mut requests = self.requests.lock().unwrap();
            let pos = requests
                .iter()
                .position(|(t, _)| t.track().url == url)
                .expect("no pending request for url");
            requests.remove(pos)
        };
        let (ticket, sink) = request;
        sink.deliver(ticket, continuation)
    }
}

impl ContinuationFetcher for ManualFetcher {
    fn request(&self, ticket: SelectionTicket, sink: ContinuationSink) {
        self.requests.lock().unwrap().push((ticket, sink));
    }
}

/// Controller wired to a recording engine and a manual fetcher
pub struct Harness {
    pub controller: PlaybackController,
    pub engine: RecordingEngine,
    pub fetcher: ManualFetcher,
    pub events: Sender<EngineEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        let engine = RecordingEngine::default();
        let fetcher = ManualFetcher::default();
        let (tx, rx) = unbounded();

        let controller = PlaybackController::new(
            Box::new(engine.clone()),
            rx,
            Box::new(fetcher.clone()),
            config,
        )
        .unwrap();
        engine.clear();

        Self {
            controller,
            engine,
            fetcher,
            events: tx,
        }
    }

    /// Send an engine event; pair with [`eventually`] to observe its effect
    pub fn emit(&self, event: EngineEvent) {
        self.events.send(event).unwrap();
    }
}

pub fn track(id: &str, url: &str) -> Track {
    Track::new(format!("Name {url}"), format!("Artist {url}"), url, TrackSource::Saavn).with_id(id)
}

/// Poll `cond` for up to two seconds
pub fn eventually(cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}
