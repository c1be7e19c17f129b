/// Interactive command parsing
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Trending,
    List,
    /// Zero-based index into the search results
    Play(usize),
    Pause,
    Resume,
    Toggle,
    Next,
    Prev,
    Stop,
    Seek(f64),
    FastForward,
    Rewind,
    Volume(i32),
    Shuffle,
    Recent,
    PlayRecent,
    Favorite,
    Favorites,
    PlayFavorites,
    Lyrics,
    Subtitles,
    Download,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

pub const HELP: &str = "\
search <query>     search for tracks
trending           show trending tracks
list               show the last results
play <n>           play result n and queue what comes next
pause | resume     pause or resume playback
toggle             toggle play/pause
next | prev        move through the playlist
stop               stop playback
seek <seconds>     jump to a position
ff | rw            skip forward / back
vol <0-100>        set the volume
shuffle            shuffle the playlist
recent [play]      list (or play) recently played tracks
fav                add/remove the current track from favorites
favorites [play]   list (or play) favorites
lyrics             fetch lyrics for the current track
subs               toggle subtitle / lyric lines
download           download the current track
status             show what is playing
quit               save and exit";

/// Parse one input line; blank lines are `Ok(None)`
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("search"));
            }
            Command::Search(rest.to_string())
        }
        "trending" => Command::Trending,
        "list" | "ls" => Command::List,
        "play" | "p" => {
            let n: usize = required("play", rest)?;
            if n == 0 {
                return Err(ParseError::InvalidArgument {
                    command: "play",
                    value: rest.to_string(),
                });
            }
            Command::Play(n - 1)
        }
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "toggle" | "t" => Command::Toggle,
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,
        "stop" => Command::Stop,
        "seek" => Command::Seek(required("seek", rest)?),
        "ff" => Command::FastForward,
        "rw" => Command::Rewind,
        "vol" | "volume" => Command::Volume(required("vol", rest)?),
        "shuffle" => Command::Shuffle,
        "recent" => with_play(rest, "recent", Command::Recent, Command::PlayRecent)?,
        "fav" => Command::Favorite,
        "favorites" | "favs" => {
            with_play(rest, "favorites", Command::Favorites, Command::PlayFavorites)?
        }
        "lyrics" => Command::Lyrics,
        "subs" => Command::Subtitles,
        "download" | "dl" => Command::Download,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn required<T: std::str::FromStr>(command: &'static str, rest: &str) -> Result<T, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingArgument(command));
    }
    rest.parse().map_err(|_| ParseError::InvalidArgument {
        command,
        value: rest.to_string(),
    })
}

fn with_play(
    rest: &str,
    command: &'static str,
    list: Command,
    play: Command,
) -> Result<Command, ParseError> {
    match rest {
        "" => Ok(list),
        "play" => Ok(play),
        other => Err(ParseError::InvalidArgument {
            command,
            value: other.to_string(),
        }),
    }
}
