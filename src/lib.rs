use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

pub mod cache;
pub mod config;
pub mod converter;
pub mod database;
pub mod domain;
pub mod engines;
pub mod error;
pub mod player;
pub mod playlists;
pub mod server;

pub use cache::MusicCache;
pub use config::Settings;
pub use database::Database;
pub use error::{Error, Result};
pub use player::Player;
pub use playlists::PlaylistStore;

/// Digest of an audio payload. Two payloads with equal hashes are
/// treated as the same recording no matter what they are named or
/// where they came from.
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

pub enum DurationStyle {
    Clean,
    Compact,
}

pub fn get_readable_duration(duration: Duration, style: DurationStyle) -> String {
    let mut secs = duration.as_secs();
    let mins = secs / 60;
    secs %= 60;

    match style {
        DurationStyle::Clean => match mins {
            0 => format!("{secs:02}s"),
            _ => format!("{mins}m {secs:02}s"),
        },
        DurationStyle::Compact => format!("{mins}:{secs:02}"),
    }
}

/// Parse a clock-style duration (`HH:MM:SS`, `MM:SS` or plain seconds),
/// the format yt-dlp prints for track lengths.
pub fn parse_clock_duration(s: &str) -> Option<Duration> {
    let mut parts = s.trim().rsplit(':');

    let secs: u64 = parts.next()?.parse().ok()?;
    let mins: u64 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    let hours: u64 = match parts.next() {
        Some(h) => h.parse().ok()?,
        None => 0,
    };

    if parts.next().is_some() {
        return None;
    }

    Some(Duration::from_secs(hours * 3600 + mins * 60 + secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_durations() {
        assert_eq!(parse_clock_duration("3:25"), Some(Duration::from_secs(205)));
        assert_eq!(
            parse_clock_duration("1:02:03"),
            Some(Duration::from_secs(3723))
        );
        assert_eq!(parse_clock_duration("47"), Some(Duration::from_secs(47)));
        assert_eq!(parse_clock_duration("not a clock"), None);
    }

    #[test]
    fn hash_is_content_only() {
        let a = content_hash(b"same bytes");
        let b = content_hash(b"same bytes");
        let c = content_hash(b"other bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn readable_durations() {
        let d = Duration::from_secs(205);
        assert_eq!(get_readable_duration(d, DurationStyle::Compact), "3:25");
        assert_eq!(get_readable_duration(d, DurationStyle::Clean), "3m 25s");
    }
}
