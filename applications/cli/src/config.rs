/// Player configuration
use crate::error::{CliError, Result};
use riff_playback::PlaybackConfig;
use riff_sources::{DEFAULT_LRCLIB_URL, DEFAULT_SAAVN_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Formats yt-dlp accepts for `--audio-format`
const AUDIO_FORMATS: &[&str] = &["best", "aac", "alac", "flac", "m4a", "mp3", "opus", "vorbis", "wav"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RiffConfig {
    #[serde(default)]
    pub player: PlaybackConfig,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub downloads: DownloadSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub sources: SourceSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default = "default_mpv_path")]
    pub mpv_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_output: Option<String>,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadSettings {
    #[serde(default = "default_download_path")]
    pub path: PathBuf,

    #[serde(default = "default_download_format")]
    pub format: String,

    #[serde(default = "default_download_program")]
    pub program: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_notify_program")]
    pub program: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSettings {
    #[serde(default = "default_saavn_base_url")]
    pub saavn_base_url: String,

    #[serde(default = "default_lrclib_base_url")]
    pub lrclib_base_url: String,

    /// Look up synced lyrics whenever a track starts
    #[serde(default = "default_enabled")]
    pub auto_lyrics: bool,
}

impl RiffConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                if let Some(default) = config_path().filter(|p| p.exists()) {
                    settings = settings.add_source(config::File::from(default));
                }
            }
        }

        // Override with environment variables, e.g. RIFF_PLAYER__VOLUME=40
        settings = settings.add_source(
            config::Environment::with_prefix("RIFF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.volume > 100 {
            return Err(CliError::Config(format!(
                "player.volume must be 0-100, got {}",
                self.player.volume
            )));
        }

        if !(self.player.seek_step_secs.is_finite() && self.player.seek_step_secs > 0.0) {
            return Err(CliError::Config(
                "player.seek_step_secs must be a positive number".to_string(),
            ));
        }

        if self.player.recent_capacity == 0 {
            return Err(CliError::Config(
                "player.recent_capacity must be at least 1".to_string(),
            ));
        }

        if !AUDIO_FORMATS.contains(&self.downloads.format.as_str()) {
            return Err(CliError::Config(format!(
                "Unsupported download format '{}' (expected one of {})",
                self.downloads.format,
                AUDIO_FORMATS.join(", ")
            )));
        }

        for (key, url) in [
            ("sources.saavn_base_url", &self.sources.saavn_base_url),
            ("sources.lrclib_base_url", &self.sources.lrclib_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CliError::Config(format!("{key} must be an http(s) URL")));
            }
        }

        Ok(())
    }

    /// Render as TOML (for `--print-config`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

/// `$XDG_CONFIG_HOME/riff/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("riff").join("config.toml"))
}

/// Directory for saved tracks and the log file
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("riff"))
        .unwrap_or_else(|| PathBuf::from(".riff"))
}

// Default values
fn default_mpv_path() -> String {
    "mpv".to_string()
}

fn default_download_path() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_download_format() -> String {
    "mp3".to_string()
}

fn default_download_program() -> String {
    "yt-dlp".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_notify_program() -> String {
    "notify-send".to_string()
}

fn default_saavn_base_url() -> String {
    DEFAULT_SAAVN_URL.to_string()
}

fn default_lrclib_base_url() -> String {
    DEFAULT_LRCLIB_URL.to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mpv_path: default_mpv_path(),
            audio_output: None,
            extra_args: Vec::new(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            path: default_download_path(),
            format: default_download_format(),
            program: default_download_program(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            program: default_notify_program(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            saavn_base_url: default_saavn_base_url(),
            lrclib_base_url: default_lrclib_base_url(),
            auto_lyrics: default_enabled(),
        }
    }
}
