//! Synced lyrics (LRC)

/// One timestamped lyric line
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub timestamp: f64,
    pub text: String,
}

/// Timestamp-sorted lyric lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    lines: Vec<LyricLine>,
}

impl Lyrics {
    /// Parse LRC text
    ///
    /// Accepts `[mm:ss]`, `[mm:ss.xx]` and `[mm:ss.xxx]` tags, several tags per
    /// line, and skips metadata tags (`[ar:...]`) and untagged lines.
    pub fn parse_lrc(source: &str) -> Self {
        let mut lines = Vec::new();

        for raw in source.lines() {
            let mut rest = raw.trim();
            let mut stamps = Vec::new();

            while let Some(tail) = rest.strip_prefix('[') {
                let Some(close) = tail.find(']') else { break };
                let Some(ts) = parse_timestamp(&tail[..close]) else {
                    break;
                };
                stamps.push(ts);
                rest = &tail[close + 1..];
            }

            let text = rest.trim();
            for timestamp in stamps {
                lines.push(LyricLine {
                    timestamp,
                    text: text.to_string(),
                });
            }
        }

        lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { lines }
    }

    /// Line to show at `position` seconds: the last line whose timestamp is
    /// not after `position`
    pub fn line_at(&self, position: f64) -> Option<&str> {
        let upto = self.lines.partition_point(|l| l.timestamp <= position);
        upto.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(|l| l.text.as_str())
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn parse_timestamp(tag: &str) -> Option<f64> {
    let (minutes, seconds) = tag.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(f64::from(minutes) * 60.0 + seconds)
}
