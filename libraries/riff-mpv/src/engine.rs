//! mpv process and IPC socket

use crate::protocol::{decode_line, encode_command, observe_commands, Incoming};
use crossbeam_channel::{unbounded, Receiver, Sender};
use riff_playback::{EngineError, EngineEvent, MediaEngine};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// How to launch mpv
#[derive(Debug, Clone)]
pub struct MpvOptions {
    /// Executable name or path
    pub program: String,

    /// IPC socket path; a per-process temp path when `None`
    pub socket_path: Option<PathBuf>,

    /// Passed as `--ao` when set
    pub audio_output: Option<String>,

    /// Extra command line arguments
    pub extra_args: Vec<String>,

    /// How long to wait for the socket to appear
    pub connect_timeout: Duration,
}

impl Default for MpvOptions {
    fn default() -> Self {
        Self {
            program: "mpv".to_string(),
            socket_path: None,
            audio_output: None,
            extra_args: Vec::new(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl MpvOptions {
    fn resolved_socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("riff-mpv-{}.sock", std::process::id()))
        })
    }

    fn args(&self, socket_path: &Path) -> Vec<String> {
        let mut args = vec![
            "--idle=yes".to_string(),
            "--no-video".to_string(),
            "--no-terminal".to_string(),
            format!("--input-ipc-server={}", socket_path.display()),
        ];
        if let Some(ao) = &self.audio_output {
            args.push(format!("--ao={ao}"));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// [`MediaEngine`] backed by an mpv instance over JSON IPC
///
/// Commands are written to the socket and return immediately. A reader
/// thread turns replies and events into [`EngineEvent`]s; a rejected command
/// surfaces as [`EngineEvent::CommandFailed`].
pub struct MpvEngine {
    writer: Mutex<UnixStream>,
    next_id: AtomicU64,
    /// request_id -> command name, until mpv replies
    pending: Arc<Mutex<HashMap<u64, String>>>,
    child: Mutex<Option<Child>>,
    socket_path: PathBuf,
    owns_socket: bool,
}

impl MpvEngine {
    /// Launch mpv in idle mode and connect to its IPC socket
    pub fn spawn(options: &MpvOptions) -> Result<(Self, Receiver<EngineEvent>), EngineError> {
        let socket_path = options.resolved_socket_path();
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let mut child = Command::new(&options.program)
            .args(options.args(&socket_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", options.program, e)))?;

        info!(
            program = %options.program,
            pid = child.id(),
            socket = %socket_path.display(),
            "Started mpv"
        );

        let started = Instant::now();
        let stream = loop {
            match UnixStream::connect(&socket_path) {
                Ok(stream) => break stream,
                Err(e) => {
                    if let Some(status) = child.try_wait()? {
                        return Err(EngineError::Spawn(format!("mpv exited early ({status})")));
                    }
                    if started.elapsed() >= options.connect_timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(EngineError::Spawn(format!(
                            "IPC socket {} not ready: {}",
                            socket_path.display(),
                            e
                        )));
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            }
        };

        Self::from_stream(stream, Some(child), socket_path, true)
    }

    /// Connect to an mpv that is already listening on `socket_path`
    pub fn attach(socket_path: impl Into<PathBuf>) -> Result<(Self, Receiver<EngineEvent>), EngineError> {
        let socket_path = socket_path.into();
        let stream = UnixStream::connect(&socket_path)?;
        Self::from_stream(stream, None, socket_path, false)
    }

    fn from_stream(
        stream: UnixStream,
        child: Option<Child>,
        socket_path: PathBuf,
        owns_socket: bool,
    ) -> Result<(Self, Receiver<EngineEvent>), EngineError> {
        let reader = stream.try_clone()?;
        let pending = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = unbounded();

        let thread_pending = Arc::clone(&pending);
        thread::Builder::new()
            .name("riff-mpv-reader".to_string())
            .spawn(move || read_loop(reader, tx, thread_pending))?;

        let engine = Self {
            writer: Mutex::new(stream),
            next_id: AtomicU64::new(1),
            pending,
            child: Mutex::new(child),
            socket_path,
            owns_socket,
        };

        for command in observe_commands() {
            engine.send(command)?;
        }

        Ok((engine, rx))
    }

    fn send(&self, args: Vec<Value>) -> Result<(), EngineError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        trace!(request_id = id, command = %name, "mpv command");

        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name);

        let line = encode_command(&args, id);
        let result = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(line.as_bytes());

        result.map_err(|e| {
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            match e.kind() {
                ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::NotConnected => {
                    EngineError::Disconnected
                }
                _ => EngineError::Io(e),
            }
        })
    }

    /// Socket this engine talks to
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

fn read_loop(
    stream: UnixStream,
    events: Sender<EngineEvent>,
    pending: Arc<Mutex<HashMap<u64, String>>>,
) {
    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "mpv socket read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let event = match decode_line(&line) {
            Ok(Incoming::Reply { request_id, error }) => {
                let command = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&request_id)
                    .unwrap_or_default();
                if error == "success" {
                    continue;
                }
                debug!(request_id, command = %command, error = %error, "mpv rejected command");
                EngineEvent::CommandFailed {
                    command,
                    reason: error,
                }
            }
            Ok(Incoming::Event(event)) => event,
            Ok(Incoming::Ignored) => continue,
            Err(e) => {
                debug!(error = %e, line = %line, "Unparseable mpv message");
                continue;
            }
        };

        if events.send(event).is_err() {
            debug!("Event receiver dropped, stopping mpv reader");
            return;
        }
    }
    info!("mpv connection closed");
}

impl MediaEngine for MpvEngine {
    fn load(&self, url: &str) -> Result<(), EngineError> {
        self.send(vec![json!("loadfile"), json!(url), json!("replace")])?;
        self.send(vec![json!("set_property"), json!("pause"), json!(false)])
    }

    fn cycle_pause(&self) -> Result<(), EngineError> {
        self.send(vec![json!("cycle"), json!("pause")])
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.send(vec![json!("stop")])
    }

    fn seek_absolute(&self, seconds: f64) -> Result<(), EngineError> {
        self.send(vec![json!("seek"), json!(seconds), json!("absolute")])
    }

    fn seek_relative(&self, delta: f64) -> Result<(), EngineError> {
        self.send(vec![json!("seek"), json!(delta), json!("relative")])
    }

    fn set_volume(&self, volume: u8) -> Result<(), EngineError> {
        self.send(vec![json!("set_property"), json!("volume"), json!(volume)])
    }
}

impl std::fmt::Debug for MpvEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpvEngine")
            .field("socket_path", &self.socket_path)
            .field("owns_socket", &self.owns_socket)
            .finish_non_exhaustive()
    }
}

impl Drop for MpvEngine {
    fn drop(&mut self) {
        let child = self
            .child
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(mut child) = child {
            let _ = self.send(vec![json!("quit")]);
            let _ = child.kill();
            let _ = child.wait();
            debug!(pid = child.id(), "Stopped mpv");
        }

        let _ = self
            .writer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .shutdown(Shutdown::Both);

        if self.owns_socket {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}
