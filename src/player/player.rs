use crate::{
    converter::Converter,
    domain::Task,
    engines::EngineRegistry,
    error::{Error, Result},
    player::{
        backend::AudioBackend,
        core::{CoreCommand, CoreEvent, PlayerCore},
        queue::PlaybackQueue,
        state::{PauseSnapshot, PlaybackMetrics, PlaybackState},
        tasks::TaskTracker,
    },
    MusicCache, PlaylistStore,
};
use crossbeam_channel::Sender;
use indexmap::IndexMap;
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};
use tracing::warn;

/// Everything a status observer wants in one read.
#[derive(Serialize)]
pub struct Status {
    pub queue_index: usize,
    pub position_secs: u64,
    pub duration_secs: u64,
    pub state: PlaybackState,
    pub queue: Vec<String>,
    pub volume: u8,
    pub tasks: IndexMap<String, Task>,
}

/// The daemon's one mutable hub: the playback queue, the state
/// machine driving the audio backend, and the composition points
/// where raw user tokens become playable audio. Cheap to clone;
/// clones share state, which is how background download and
/// end-of-stream workers reach back in.
#[derive(Clone)]
pub struct Player {
    inner: Arc<PlayerInner>,
}

pub(super) struct PlayerInner {
    pub(super) queue: Mutex<PlaybackQueue>,
    pub(super) metrics: Arc<PlaybackMetrics>,
    pub(super) pause_snapshot: Mutex<Option<PauseSnapshot>>,
    pub(super) volume: AtomicU8,
    pub(super) core_tx: Sender<CoreCommand>,
    pub(super) tasks: TaskTracker,
    pub(super) cache: MusicCache,
    pub(super) playlists: PlaylistStore,
    pub(super) engines: EngineRegistry,
    pub(super) converter: Arc<dyn Converter>,
    pub(super) search_timeout: Duration,
}

impl Player {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        cache: MusicCache,
        playlists: PlaylistStore,
        engines: EngineRegistry,
        converter: Arc<dyn Converter>,
        search_timeout: Duration,
    ) -> Self {
        let (core_tx, core_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let metrics = Arc::new(PlaybackMetrics::default());

        let _core_thread = PlayerCore::spawn(backend, core_rx, event_tx, Arc::clone(&metrics));

        let player = Player {
            inner: Arc::new(PlayerInner {
                queue: Mutex::new(PlaybackQueue::new()),
                metrics,
                pause_snapshot: Mutex::new(None),
                volume: AtomicU8::new(100),
                core_tx,
                tasks: TaskTracker::new(),
                cache,
                playlists,
                engines,
                converter,
                search_timeout,
            }),
        };

        // End-of-stream watcher. Blocks on the event channel only, so
        // a hung backend can never deadlock the player's own locks.
        let watcher = player.clone();
        let _event_thread = thread::Builder::new()
            .name("playback-events".into())
            .spawn(move || {
                for event in event_rx {
                    match event {
                        CoreEvent::EndOfStream => watcher.next(),
                        CoreEvent::LoadFailed(reason) => {
                            warn!("stopping after undecodable track: {reason}");
                            watcher.stop();
                        }
                    }
                }
            })
            .expect("failed to spawn playback event thread");

        player
    }

    pub(super) fn inner(&self) -> &PlayerInner {
        &self.inner
    }

    // ====================
    //   STATE MACHINE
    // ====================

    pub fn state(&self) -> PlaybackState {
        self.inner.metrics.get_state()
    }

    /// Start (or restart) playback of the queue's current track. An
    /// empty queue makes this a no-op.
    pub fn play(&self) -> Result<()> {
        let data = {
            let queue = self.inner.queue.lock().unwrap();
            queue.current().map(|t| Arc::clone(&t.data))
        };
        let Some(data) = data else {
            return Ok(());
        };

        self.clear_snapshot();
        self.inner.metrics.set_position(Duration::ZERO);
        self.inner.metrics.set_state(PlaybackState::Playing);
        self.send(CoreCommand::Load(data));
        self.send(CoreCommand::SetVolume(self.volume()));

        Ok(())
    }

    /// Freeze position/duration first, then engage the engine lock;
    /// every status query until resume reads the frozen pair.
    pub fn pause(&self) {
        if self.state() != PlaybackState::Playing {
            return;
        }

        let snapshot = PauseSnapshot {
            position: self.inner.metrics.get_position(),
            duration: self.current_duration(),
        };
        *self.inner.pause_snapshot.lock().unwrap() = Some(snapshot);

        self.inner.metrics.set_state(PlaybackState::Paused);
        self.send(CoreCommand::Pause);
    }

    pub fn resume(&self) {
        if self.state() != PlaybackState::Paused {
            return;
        }

        self.clear_snapshot();
        self.inner.metrics.set_state(PlaybackState::Playing);
        self.send(CoreCommand::Resume);
    }

    /// Full stop: queue, tasks, snapshot, and engine all reset.
    pub fn stop(&self) {
        self.inner.tasks.clear_all();

        if self.state() == PlaybackState::Stopped {
            return;
        }

        self.inner.queue.lock().unwrap().clear();
        self.clear_snapshot();
        self.inner.metrics.reset();
        self.send(CoreCommand::Stop);
    }

    /// Advance the cyclic pointer and play. Outside of playback this
    /// is a silent no-op.
    pub fn next(&self) {
        if self.state() == PlaybackState::Stopped {
            return;
        }
        if self.state() == PlaybackState::Paused {
            self.resume();
        }

        let has_tracks = {
            let mut queue = self.inner.queue.lock().unwrap();
            queue.advance();
            !queue.is_empty()
        };
        match has_tracks {
            true => {
                let _ = self.play();
            }
            false => self.stop(),
        }
    }

    pub fn prev(&self) {
        if self.state() == PlaybackState::Stopped {
            return;
        }
        if self.state() == PlaybackState::Paused {
            self.resume();
        }

        let has_tracks = {
            let mut queue = self.inner.queue.lock().unwrap();
            queue.retreat();
            !queue.is_empty()
        };
        match has_tracks {
            true => {
                let _ = self.play();
            }
            false => self.stop(),
        }
    }

    /// Seek relative to the current position, clamped to the track.
    /// A paused engine is briefly resumed around the seek; the engine
    /// lock cannot service one while held.
    pub fn seek(&self, delta_secs: i64) -> Result<()> {
        let state = self.state();
        if state == PlaybackState::Stopped {
            return Err(Error::ResourceBusy("seek"));
        }

        let was_paused = state == PlaybackState::Paused;
        if was_paused {
            self.resume();
        }

        let position = self.inner.metrics.get_position();
        let duration = self.current_duration();
        let target = match delta_secs >= 0 {
            true => position.saturating_add(Duration::from_secs(delta_secs as u64)),
            false => position.saturating_sub(Duration::from_secs(delta_secs.unsigned_abs())),
        }
        .min(duration);

        self.inner.metrics.set_position(target);
        self.send(CoreCommand::SeekTo(target));

        if was_paused {
            self.pause();
        }

        Ok(())
    }

    pub fn set_volume(&self, percent: u8) -> Result<()> {
        if self.state() == PlaybackState::Stopped {
            return Err(Error::ResourceBusy("volume"));
        }

        let percent = percent.min(100);
        self.inner.volume.store(percent, Ordering::Relaxed);
        self.send(CoreCommand::SetVolume(percent));

        Ok(())
    }

    /// Remove a queue entry by index or name. Removing the last entry
    /// degenerates to stop; removing the playing entry hands playback
    /// to its successor.
    pub fn remove(&self, target: &str) -> Result<()> {
        let (was_current, emptied) = {
            let mut queue = self.inner.queue.lock().unwrap();
            let index = queue
                .resolve(target)
                .ok_or_else(|| Error::not_found(format!("queue entry {target}")))?;

            if queue.len() == 1 {
                (false, true)
            } else {
                let was_current = index == queue.current_index();
                queue.remove(index);
                (was_current, false)
            }
        };

        if emptied {
            self.stop();
            // stop() is a no-op when already stopped; the entry goes
            // away either way
            self.inner.queue.lock().unwrap().clear();
        } else if was_current && self.state() != PlaybackState::Stopped {
            if self.state() == PlaybackState::Paused {
                self.resume();
            }
            // remove() already parked the pointer on the successor
            self.play()?;
        }

        Ok(())
    }

    // ====================
    //   STATUS
    // ====================

    /// Position reporting honors the pause snapshot: while the engine
    /// is locked, every call answers the frozen value.
    pub fn position(&self) -> Duration {
        match self.state() {
            PlaybackState::Stopped => Duration::ZERO,
            PlaybackState::Paused => self
                .inner
                .pause_snapshot
                .lock()
                .unwrap()
                .map(|s| s.position)
                .unwrap_or_default(),
            PlaybackState::Playing => self.inner.metrics.get_position(),
        }
    }

    pub fn duration(&self) -> Duration {
        match self.state() {
            PlaybackState::Paused => self
                .inner
                .pause_snapshot
                .lock()
                .unwrap()
                .map(|s| s.duration)
                .unwrap_or_default(),
            _ => self.current_duration(),
        }
    }

    pub fn volume(&self) -> u8 {
        self.inner.volume.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> Status {
        let (queue_index, titles) = {
            let queue = self.inner.queue.lock().unwrap();
            (queue.current_index(), queue.titles())
        };

        Status {
            queue_index,
            position_secs: self.position().as_secs(),
            duration_secs: self.duration().as_secs(),
            state: self.state(),
            queue: titles,
            volume: self.volume(),
            tasks: self.inner.tasks.snapshot(),
        }
    }

    // ====================
    //   PLAYLISTS
    // ====================

    pub fn create_playlist(&self, name: &str) -> Result<()> {
        self.inner.playlists.create(name)
    }

    pub fn remove_playlist(&self, name: &str) -> Result<()> {
        self.inner.playlists.remove(name)
    }

    pub fn playlist_names(&self) -> Result<Vec<String>> {
        self.inner.playlists.names()
    }

    pub fn playlist_track_names(&self, name: &str) -> Result<Vec<String>> {
        self.inner.playlists.track_names(name)
    }

    pub fn remove_track_from_playlist(&self, playlist: &str, target: &str) -> Result<()> {
        self.inner.playlists.remove_track(playlist, &target.into())
    }

    pub fn clean_cache(&self) -> Result<usize> {
        self.inner.cache.clean_orphaned()
    }

    // ====================
    //   INTERNAL
    // ====================

    pub(super) fn current_duration(&self) -> Duration {
        self.inner
            .queue
            .lock()
            .unwrap()
            .current()
            .map(|t| t.duration)
            .unwrap_or_default()
    }

    pub(super) fn send(&self, cmd: CoreCommand) {
        let _ = self.inner.core_tx.send(cmd);
    }

    fn clear_snapshot(&self) {
        *self.inner.pause_snapshot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Track, TaskKind};
    use crate::player::testing::harness;
    use std::time::Instant;

    fn track(name: &str) -> Track {
        let mut payload = b"AUDIO ".to_vec();
        payload.extend_from_slice(name.as_bytes());
        Track::from_parts(name, "test", name, payload, Duration::from_secs(180))
    }

    fn wait_for<F: Fn() -> bool>(cond: F) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not met in time");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn pause_freezes_position_until_resume() {
        let (player, handle) = harness(|_| {});
        player.enqueue_track(track("a"));
        player.play().unwrap();

        wait_for(|| handle.load_count() == 1);
        wait_for(|| player.position() > Duration::ZERO);

        player.pause();
        let frozen = player.position();
        let frozen_duration = player.duration();

        // Every read while paused answers the same snapshot
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(20));
            assert_eq!(player.position(), frozen);
            assert_eq!(player.duration(), frozen_duration);
        }

        player.resume();
        wait_for(|| player.position() != frozen);
    }

    #[test]
    fn seek_and_volume_require_active_playback() {
        let (player, _) = harness(|_| {});

        assert!(matches!(player.seek(5), Err(Error::ResourceBusy(_))));
        assert!(matches!(
            player.set_volume(50),
            Err(Error::ResourceBusy(_))
        ));

        player.enqueue_track(track("a"));
        player.play().unwrap();
        player.set_volume(50).unwrap();
        assert_eq!(player.volume(), 50);
        player.seek(5).unwrap();
    }

    #[test]
    fn seek_clamps_to_the_track() {
        let (player, _) = harness(|_| {});
        player.enqueue_track(track("a"));
        player.play().unwrap();

        // Far past the end clamps to the track duration (180s). The
        // playback thread settles on the seeked position within a few
        // ticks
        player.seek(10_000).unwrap();
        wait_for(|| {
            let pos = player.inner.metrics.get_position();
            pos >= Duration::from_secs(179) && pos <= Duration::from_secs(182)
        });

        // Far before the start clamps to zero rather than wrapping
        player.seek(-20_000).unwrap();
        wait_for(|| player.inner.metrics.get_position() < Duration::from_secs(2));
    }

    #[test]
    fn stop_clears_queue_tasks_and_position() {
        let (player, _) = harness(|_| {});
        player.enqueue_track(track("a"));
        player.play().unwrap();
        player.inner.tasks.start("leftover", TaskKind::Downloading);

        player.stop();

        let status = player.status();
        assert_eq!(status.state, PlaybackState::Stopped);
        assert!(status.queue.is_empty());
        assert!(status.tasks.is_empty());
        assert_eq!(status.position_secs, 0);
    }

    #[test]
    fn next_and_prev_are_noops_while_stopped() {
        let (player, handle) = harness(|_| {});
        player.enqueue_track(track("a"));

        player.next();
        player.prev();

        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(handle.load_count(), 0);
    }

    #[test]
    fn remove_last_entry_degenerates_to_stop() {
        let (player, _) = harness(|_| {});
        player.enqueue_track(track("a"));
        player.play().unwrap();

        player.remove("a").unwrap();

        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(player.status().queue.is_empty());
    }

    #[test]
    fn remove_current_hands_playback_to_successor() {
        let (player, handle) = harness(|_| {});
        for name in ["a", "b", "c"] {
            player.enqueue_track(track(name));
        }
        player.inner.queue.lock().unwrap().jump_to(1);
        player.play().unwrap();
        wait_for(|| handle.load_count() == 1);

        player.remove("b").unwrap();

        let status = player.status();
        assert_eq!(status.queue, vec!["a", "c"]);
        assert_eq!(status.queue_index, 1); // "c"
        assert_eq!(status.state, PlaybackState::Playing);
        wait_for(|| handle.load_count() == 2);
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let (player, _) = harness(|_| {});
        player.enqueue_track(track("a"));
        assert!(matches!(
            player.remove("ghost"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn end_of_stream_advances_cyclically() {
        let (player, handle) = harness(|_| {});
        player.enqueue_track(track("a"));
        player.enqueue_track(track("b"));
        player.play().unwrap();
        wait_for(|| handle.load_count() == 1);

        handle.finish_track();
        wait_for(|| handle.load_count() == 2);
        assert_eq!(player.status().queue_index, 1);

        // Wrapping past the tail lands back on the head
        handle.finish_track();
        wait_for(|| handle.load_count() == 3);
        assert_eq!(player.status().queue_index, 0);
        assert_eq!(player.state(), PlaybackState::Playing);
    }
}
