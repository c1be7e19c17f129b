//! mpv JSON IPC wire format
//!
//! One JSON object per line in both directions. Commands carry a
//! `request_id` which mpv echoes in its reply; unsolicited events carry an
//! `event` name. Property observations registered with `observe_property`
//! come back as `property-change` events tagged with our observation id.

use riff_playback::{EndReason, EngineEvent};
use serde::Deserialize;
use serde_json::{json, Value};

pub const OBS_TIME_POS: u64 = 1;
pub const OBS_DURATION: u64 = 2;
pub const OBS_PAUSE: u64 = 3;
pub const OBS_VOLUME: u64 = 4;
pub const OBS_SUB_TEXT: u64 = 5;

/// Properties observed on every connection
pub const OBSERVED: [(u64, &str); 5] = [
    (OBS_TIME_POS, "time-pos"),
    (OBS_DURATION, "duration"),
    (OBS_PAUSE, "pause"),
    (OBS_VOLUME, "volume"),
    (OBS_SUB_TEXT, "sub-text"),
];

/// Serialize a command line (newline terminated)
pub fn encode_command(args: &[Value], request_id: u64) -> String {
    let mut line = json!({ "command": args, "request_id": request_id }).to_string();
    line.push('\n');
    line
}

/// `observe_property` command arguments for [`OBSERVED`]
pub fn observe_commands() -> Vec<Vec<Value>> {
    OBSERVED
        .iter()
        .map(|(id, name)| vec![json!("observe_property"), json!(id), json!(name)])
        .collect()
}

/// A decoded line from mpv
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Reply to one of our commands
    Reply {
        request_id: u64,
        /// `"success"` or an error string
        error: String,
    },
    /// Event the controller cares about
    Event(EngineEvent),
    /// Everything else (start-file, idle, audio-reconfig, ...)
    Ignored,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    event: Option<String>,
    request_id: Option<u64>,
    error: Option<String>,
    id: Option<u64>,
    #[serde(default)]
    data: Value,
    reason: Option<String>,
    file_error: Option<String>,
}

/// Decode one line received from mpv
pub fn decode_line(line: &str) -> Result<Incoming, serde_json::Error> {
    let msg: RawMessage = serde_json::from_str(line)?;

    let Some(event) = msg.event.as_deref() else {
        return Ok(match (msg.request_id, msg.error) {
            (Some(request_id), Some(error)) => Incoming::Reply { request_id, error },
            _ => Incoming::Ignored,
        });
    };

    let decoded = match event {
        "file-loaded" => Some(EngineEvent::FileLoaded),
        "end-file" => Some(EngineEvent::EndOfFile(EndReason::parse(
            msg.reason.as_deref().unwrap_or_default(),
            msg.file_error.as_deref(),
        ))),
        "property-change" => msg.id.and_then(|id| property_event(id, &msg.data)),
        _ => None,
    };

    Ok(decoded.map_or(Incoming::Ignored, Incoming::Event))
}

fn property_event(id: u64, data: &Value) -> Option<EngineEvent> {
    match id {
        OBS_TIME_POS => data.as_f64().map(EngineEvent::PositionChanged),
        OBS_DURATION => data.as_f64().map(EngineEvent::DurationChanged),
        OBS_PAUSE => data.as_bool().map(EngineEvent::PauseChanged),
        OBS_VOLUME => data.as_f64().map(EngineEvent::VolumeChanged),
        OBS_SUB_TEXT => Some(EngineEvent::SubtitleChanged(
            data.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        )),
        _ => None,
    }
}
