use crate::domain::Track;
use indexmap::IndexMap;

/// The ordered set of tracks queued for playback, keyed by payload
/// hash so the same recording can never sit in the queue twice, plus
/// the cyclic pointer at whatever is (or would be) playing.
#[derive(Default)]
pub struct PlaybackQueue {
    entries: IndexMap<u64, Track>,
    current: usize,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        PlaybackQueue::default()
    }

    /// Append a track. Enqueueing a payload already present is a
    /// no-op; returns whether the queue changed.
    pub fn enqueue(&mut self, track: Track) -> bool {
        if self.entries.contains_key(&track.hash) {
            return false;
        }
        self.entries.insert(track.hash, track);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Track> {
        self.entries.get_index(self.current).map(|(_, t)| t)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.entries.get_index(index).map(|(_, t)| t)
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        match index < self.entries.len() {
            true => {
                self.current = index;
                true
            }
            false => false,
        }
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.entries.values().position(|t| t.name == name)
    }

    pub fn index_of_hash(&self, hash: u64) -> Option<usize> {
        self.entries.get_index_of(&hash)
    }

    /// Resolve a queue reference: an in-range integer, else a track
    /// name.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        match token.parse::<usize>() {
            Ok(i) if i < self.entries.len() => Some(i),
            Ok(_) => None,
            Err(_) => self.index_of_name(token),
        }
    }

    pub fn advance(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.entries.len();
    }

    pub fn retreat(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.current = match self.current {
            0 => self.entries.len() - 1,
            c => c - 1,
        };
    }

    /// Remove by position, keeping `current` on the entry that should
    /// play next: removing ahead of the pointer shifts it back, and
    /// removing the tail while pointing at it wraps to the front.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        let (_, removed) = self.entries.shift_remove_index(index)?;

        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.entries.len() {
            self.current = 0;
        }

        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries.values().map(|t| t.name.clone()).collect()
    }
}
