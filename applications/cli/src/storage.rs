/// Saved track lists (`tracks.json`)
use crate::error::{CliError, Result};
use riff_core::Track;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TRACKS_FILE: &str = "tracks.json";

/// Everything persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Most recent first
    #[serde(default)]
    pub recently_played: Vec<Track>,

    #[serde(default)]
    pub favorites: Vec<Track>,
}

impl Library {
    /// Add `track` to favorites, or remove it if already there (by URL)
    ///
    /// Returns `true` when the track is now a favorite.
    pub fn toggle_favorite(&mut self, track: &Track) -> bool {
        if let Some(pos) = self.favorites.iter().position(|t| t.url == track.url) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(track.clone());
            true
        }
    }

    pub fn is_favorite(&self, url: &str) -> bool {
        self.favorites.iter().any(|t| t.url == url)
    }
}

/// JSON file store for [`Library`]
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/tracks.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TRACKS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the library; a missing file is an empty library
    pub fn load(&self) -> Result<Library> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved tracks yet");
                return Ok(Library::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| {
            CliError::Storage(format!("{} is corrupted: {}", self.path.display(), e))
        })
    }

    /// Write the library, replacing the file atomically
    pub fn save(&self, library: &Library) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(library)?)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            recent = library.recently_played.len(),
            favorites = library.favorites.len(),
            "Saved tracks"
        );
        Ok(())
    }
}
