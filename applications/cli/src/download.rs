/// Track downloads through yt-dlp
///
/// One download at a time; a second request is rejected while the first runs.
use crate::config::DownloadSettings;
use crate::error::{CliError, Result};
use riff_core::Track;
use riff_playback::{FlightGuard, SingleFlight};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Downloader {
    settings: DownloadSettings,
    flight: SingleFlight,
}

/// A claimed download slot, ready to run
#[derive(Debug)]
pub struct PendingDownload {
    program: String,
    args: Vec<String>,
    target: PathBuf,
    label: String,
    _guard: FlightGuard,
}

impl Downloader {
    pub fn new(settings: DownloadSettings) -> Self {
        Self {
            settings,
            flight: SingleFlight::new("Download"),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    /// Claim the download slot for `track`
    ///
    /// Fails with `AlreadyInProgress` while another download runs.
    pub fn begin(&self, track: &Track) -> Result<PendingDownload> {
        let guard = self.flight.try_begin()?;

        let stem = sanitize(&track.display_label());
        let target = self
            .settings
            .path
            .join(format!("{}.{}", stem, self.settings.format));
        let template = self.settings.path.join(format!("{stem}.%(ext)s"));

        let args = vec![
            "-q".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            self.settings.format.clone(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            track.url.clone(),
        ];

        Ok(PendingDownload {
            program: self.settings.program.clone(),
            args,
            target,
            label: track.display_label(),
            _guard: guard,
        })
    }
}

impl PendingDownload {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the download to completion, releasing the slot afterwards
    pub async fn run(self) -> Result<PathBuf> {
        if let Some(dir) = self.target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        info!(program = %self.program, track = %self.label, "Starting download");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CliError::Download(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(track = %self.label, status = %output.status, stderr = %stderr, "Download failed");
            return Err(CliError::Download(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            }));
        }

        info!(track = %self.label, path = %self.target.display(), "Download complete");
        Ok(self.target)
    }
}

/// Strip characters that cannot appear in a file name
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riff_core::TrackSource;
    use riff_playback::PlaybackError;
    use tempfile::TempDir;

    fn settings(dir: &TempDir, program: &str) -> DownloadSettings {
        DownloadSettings {
            path: dir.path().to_path_buf(),
            format: "mp3".to_string(),
            program: program.to_string(),
        }
    }

    fn track() -> Track {
        Track::new("AC/DC Song", "Band", "https://example.com/s", TrackSource::Saavn)
    }

    #[test]
    fn builds_yt_dlp_arguments() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(settings(&dir, "yt-dlp"));

        let pending = downloader.begin(&track()).unwrap();
        let args = pending.args();

        assert_eq!(&args[..4], ["-q", "-x", "--audio-format", "mp3"]);
        assert_eq!(args[4], "-o");
        assert!(args[5].ends_with("AC_DC Song - Band.%(ext)s"));
        assert_eq!(args[6], "https://example.com/s");
    }

    #[test]
    fn second_download_is_rejected() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(settings(&dir, "yt-dlp"));

        let first = downloader.begin(&track()).unwrap();
        let err = downloader.begin(&track()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Playback(PlaybackError::AlreadyInProgress("Download"))
        ));
        assert_eq!(err.to_string(), "Download already in progress");

        drop(first);
        assert!(!downloader.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_releases_slot() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(settings(&dir, "true"));

        let path = downloader.begin(&track()).unwrap().run().await.unwrap();

        assert!(path.ends_with("AC_DC Song - Band.mp3"));
        assert!(!downloader.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_download_error() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(settings(&dir, "false"));

        let result = downloader.begin(&track()).unwrap().run().await;

        assert!(matches!(result, Err(CliError::Download(_))));
        assert!(!downloader.is_busy());
    }

    #[tokio::test]
    async fn missing_program_is_download_error() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(settings(&dir, "riff-no-such-downloader"));

        let result = downloader.begin(&track()).unwrap().run().await;

        assert!(matches!(result, Err(CliError::Download(_))));
    }
}
