use serde::Serialize;
use std::{
    sync::atomic::{AtomicU64, AtomicU8, Ordering},
    time::Duration,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl From<u8> for PlaybackState {
    fn from(raw: u8) -> Self {
        match raw {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

/// Lock-free view of what the playback thread is doing. The core
/// thread publishes position; the player owns state transitions.
#[derive(Default)]
pub struct PlaybackMetrics {
    state: AtomicU8,
    position_ms: AtomicU64,
}

impl PlaybackMetrics {
    pub fn get_state(&self) -> PlaybackState {
        self.state.load(Ordering::Relaxed).into()
    }

    pub fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    pub fn get_position(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::Relaxed))
    }

    pub fn set_position(&self, d: Duration) {
        self.position_ms
            .store(d.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.get_state() == PlaybackState::Stopped
    }

    pub fn reset(&self) {
        self.set_position(Duration::ZERO);
        self.set_state(PlaybackState::Stopped);
    }
}

/// Position and duration captured at the instant pause engaged. While
/// the audio engine is held paused, status queries answer from this
/// instead of poking a locked backend.
#[derive(Clone, Copy)]
pub struct PauseSnapshot {
    pub position: Duration,
    pub duration: Duration,
}
