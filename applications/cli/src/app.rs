/// Command dispatch for the interactive front end
use crate::commands::{Command, HELP};
use crate::config::RiffConfig;
use crate::download::Downloader;
use crate::error::Result;
use crate::lyrics::{LyricsOutcome, LyricsService, LyricsWatcher};
use crate::notifier::Notifier;
use crate::storage::{Library, Store};
use riff_core::{Track, TrackProvider};
use riff_playback::PlaybackController;
use riff_sources::{LrclibClient, SaavnClient};
use std::sync::Arc;
use tracing::{info, warn};

/// Output of one command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn none() -> Self {
        Self::default()
    }
}

pub struct App {
    controller: PlaybackController,
    saavn: Arc<SaavnClient>,
    lyrics: LyricsService,
    downloader: Downloader,
    notifier: Notifier,
    store: Store,
    library: Library,
    _lyrics_watcher: Option<LyricsWatcher>,
}

impl App {
    /// Restores recently played tracks from `store` into the controller and,
    /// when `sources.auto_lyrics` is set, starts fetching lyrics for every
    /// track the engine loads
    pub fn new(
        controller: PlaybackController,
        saavn: Arc<SaavnClient>,
        lyrics: LrclibClient,
        config: &RiffConfig,
        store: Store,
    ) -> Self {
        let library = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Starting with an empty library");
            Library::default()
        });
        controller.restore_recently_played(library.recently_played.clone());

        let notifier = Notifier::new(&config.notifications);
        let lyrics = LyricsService::new(lyrics);
        let lyrics_watcher = if config.sources.auto_lyrics {
            lyrics.follow(&controller, notifier.clone())
        } else {
            None
        };

        Self {
            controller,
            saavn,
            lyrics,
            downloader: Downloader::new(config.downloads.clone()),
            notifier,
            store,
            library,
            _lyrics_watcher: lyrics_watcher,
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Search(query) => match self.saavn.search(&query).await {
                Ok(tracks) => self.show_results(tracks),
                Err(e) => Reply::line(format!("Search failed: {e}")),
            },
            Command::Trending => match self.saavn.trending().await {
                Ok(tracks) => self.show_results(tracks),
                Err(e) => Reply::line(format!("Trending failed: {e}")),
            },
            Command::List => {
                let results = self.controller.search_results();
                if results.is_empty() {
                    Reply::line("No results (run 'search' first)")
                } else {
                    Reply::lines(numbered(&results))
                }
            }
            Command::Play(index) => {
                let results = self.controller.search_results();
                let Some(track) = results.get(index) else {
                    return Reply::line(format!("No result {} (run 'search' first)", index + 1));
                };
                self.controller.select_result(index);
                // A failed first load rolls the session back
                if self.controller.session().current_url() == track.url {
                    Reply::line(format!("Playing {}", track.display_label()))
                } else {
                    Reply::line(format!("Failed to play {}", track.display_label()))
                }
            }
            Command::Pause => {
                self.controller.pause();
                Reply::none()
            }
            Command::Resume => {
                self.controller.resume();
                Reply::none()
            }
            Command::Toggle => {
                self.controller.toggle_play_pause();
                Reply::none()
            }
            Command::Next => {
                self.controller.advance_selection();
                self.now_playing()
            }
            Command::Prev => {
                self.controller.retreat_selection();
                self.now_playing()
            }
            Command::Stop => {
                self.controller.stop();
                Reply::line("Stopped")
            }
            Command::Seek(seconds) => {
                self.controller.seek(seconds);
                Reply::none()
            }
            Command::FastForward => {
                self.controller.fast_forward();
                Reply::none()
            }
            Command::Rewind => {
                self.controller.rewind();
                Reply::none()
            }
            Command::Volume(volume) => {
                let applied = self.controller.set_volume(volume);
                Reply::line(format!("Volume {applied}"))
            }
            Command::Shuffle => {
                if self.controller.shuffle() {
                    Reply::line(format!("Shuffled {} tracks", self.controller.playlist().len()))
                } else {
                    Reply::line("Nothing to shuffle")
                }
            }
            Command::Recent => {
                let recent = self.controller.recently_played();
                if recent.is_empty() {
                    Reply::line("Nothing played yet")
                } else {
                    Reply::lines(numbered(&recent))
                }
            }
            Command::PlayRecent => self.play_list(self.controller.recently_played(), "Nothing played yet"),
            Command::Favorite => self.toggle_favorite(),
            Command::Favorites => {
                if self.library.favorites.is_empty() {
                    Reply::line("No favorites yet")
                } else {
                    Reply::lines(numbered(&self.library.favorites))
                }
            }
            Command::PlayFavorites => self.play_list(self.library.favorites.clone(), "No favorites yet"),
            Command::Lyrics => self.fetch_lyrics().await,
            Command::Subtitles => {
                let enabled = self.controller.toggle_subtitles();
                Reply::line(if enabled { "Subtitles on" } else { "Subtitles off" })
            }
            Command::Download => self.download(),
            Command::Status => Reply::line(self.status()),
            Command::Help => Reply::lines(HELP.lines().map(ToString::to_string).collect()),
            Command::Quit => {
                if let Err(e) = self.save() {
                    warn!(error = %e, "Failed to save tracks");
                }
                self.controller.stop();
                Reply {
                    lines: Vec::new(),
                    quit: true,
                }
            }
        }
    }

    /// Persist recently played tracks and favorites
    pub fn save(&mut self) -> Result<()> {
        self.library.recently_played = self.controller.recently_played();
        self.store.save(&self.library)
    }

    /// One-line playback summary
    pub fn status(&self) -> String {
        let session = self.controller.session();
        let Some(track) = self.controller.current_track().filter(|_| session.is_loaded()) else {
            return "Stopped".to_string();
        };

        let state = if session.is_paused() { "Paused" } else { "Playing" };
        let position = match self.controller.playlist_index() {
            Some(index) => format!(" [{}/{}]", index + 1, self.controller.playlist().len()),
            None => String::new(),
        };

        format!(
            "{state}: {} {}/{} vol {}{position}",
            track.display_label(),
            format_time(session.position()),
            format_time(session.duration()),
            session.volume(),
        )
    }

    fn show_results(&self, tracks: Vec<Track>) -> Reply {
        if tracks.is_empty() {
            self.controller.set_search_results(tracks);
            return Reply::line("No results");
        }
        let lines = numbered(&tracks);
        self.controller.set_search_results(tracks);
        Reply::lines(lines)
    }

    fn now_playing(&self) -> Reply {
        match self.controller.current_track() {
            Some(track) => Reply::line(format!("Playing {}", track.display_label())),
            None => Reply::none(),
        }
    }

    fn play_list(&self, tracks: Vec<Track>, empty: &str) -> Reply {
        let count = tracks.len();
        if self.controller.replace_and_play(tracks) {
            Reply::line(format!("Playing {count} tracks"))
        } else {
            Reply::line(empty)
        }
    }

    fn toggle_favorite(&mut self) -> Reply {
        let Some(track) = self.controller.current_track() else {
            return Reply::line("Nothing is playing");
        };

        let added = self.library.toggle_favorite(&track);
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to save favorites");
        }

        Reply::line(if added {
            format!("Added {} to favorites", track.display_label())
        } else {
            format!("Removed {} from favorites", track.display_label())
        })
    }

    async fn fetch_lyrics(&mut self) -> Reply {
        let Some(track) = self.controller.current_track() else {
            return Reply::line("Nothing is playing");
        };

        match self.lyrics.load(&self.controller, &track).await {
            Ok(LyricsOutcome::Synced { lines, applied: true }) => {
                Reply::line(format!("Loaded {lines} lyric lines"))
            }
            Ok(LyricsOutcome::Synced { applied: false, .. }) => {
                Reply::line("Track changed before the lyrics arrived")
            }
            Ok(LyricsOutcome::Plain(text)) => {
                Reply::lines(text.lines().map(ToString::to_string).collect())
            }
            Ok(LyricsOutcome::NotFound) => Reply::line("No lyrics found"),
            Err(e) => Reply::line(e.to_string()),
        }
    }

    fn download(&self) -> Reply {
        let Some(track) = self.controller.current_track() else {
            return Reply::line("Nothing is playing");
        };

        let pending = match self.downloader.begin(&track) {
            Ok(pending) => pending,
            Err(e) => return Reply::line(e.to_string()),
        };

        let label = pending.label().to_string();
        let notifier = self.notifier.clone();
        notifier.notify(&format!("Started downloading: {label}"));
        tokio::spawn(async move {
            match pending.run().await {
                Ok(path) => {
                    info!(path = %path.display(), "Downloaded");
                    notifier.notify(&format!("Download completed: {}", path.display()));
                }
                Err(e) => notifier.notify(&format!("Download failed: {e}")),
            }
        });

        Reply::line(format!("Downloading {label}"))
    }
}

fn numbered(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{:>2}. {}", i + 1, t.display_label()))
        .collect()
}

/// `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
