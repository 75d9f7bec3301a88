use crate::domain::{Track, CACHE_SOURCE};
use serde::Serialize;
use std::time::Duration;

/// One candidate row returned by a search, whichever worker produced
/// it. `destination` is what a follow-up play/download request should
/// pass back in: an engine identifier for online hits, the cache key
/// for cached ones.
#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub destination: String,
    pub source: String,
    pub duration_secs: u64,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        destination: impl Into<String>,
        source: impl Into<String>,
        duration: Duration,
    ) -> Self {
        SearchResult {
            title: title.into(),
            destination: destination.into(),
            source: source.into(),
            duration_secs: duration.as_secs(),
        }
    }

    pub fn from_cached(track: &Track) -> Self {
        SearchResult::new(
            track.name.clone(),
            track.key.clone(),
            CACHE_SOURCE,
            track.duration,
        )
    }
}
