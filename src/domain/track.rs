use crate::{content_hash, get_readable_duration, DurationStyle};
use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::{fmt, io::Cursor, sync::Arc, time::Duration};

/// A named, content-hashable audio payload. Immutable once built; the
/// payload is shared so a track can sit in the queue, the cache, and a
/// background worker without copies.
#[derive(Clone)]
pub struct Track {
    pub name: String,
    pub source: String,
    pub key: String,
    pub data: Arc<[u8]>,
    pub hash: u64,
    pub duration: Duration,
}

impl Track {
    /// Build a track from freshly obtained audio bytes. The hash is
    /// derived from the payload, the duration probed from its headers
    /// (zero when the payload carries none we can read).
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        key: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        let duration = probe_duration(&data).unwrap_or_default();
        Self::from_parts(name, source, key, data, duration)
    }

    /// Build a track when the duration is already known, skipping the
    /// header probe. Also the constructor used when loading rows back
    /// out of storage.
    pub fn from_parts(
        name: impl Into<String>,
        source: impl Into<String>,
        key: impl Into<String>,
        data: Vec<u8>,
        duration: Duration,
    ) -> Self {
        let hash = content_hash(&data);
        Track {
            name: name.into(),
            source: source.into(),
            key: key.into(),
            data: data.into(),
            hash,
            duration,
        }
    }

    pub fn duration_str(&self) -> String {
        get_readable_duration(self.duration, DurationStyle::Compact)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn probe_duration(data: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(data))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_tracks_payload_not_name() {
        let a = Track::new("one name", "local", "/a", b"identical".to_vec());
        let b = Track::new("other name", "youtube", "xyz", b"identical".to_vec());
        assert_eq!(a.hash, b.hash);

        let c = Track::new("one name", "local", "/a", b"different".to_vec());
        assert_ne!(a.hash, c.hash);
    }

    #[test]
    fn unreadable_payload_defaults_to_zero_duration() {
        let t = Track::new("noise", "local", "/noise", vec![0u8; 64]);
        assert_eq!(t.duration, Duration::ZERO);
    }
}
