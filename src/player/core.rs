use crate::player::{
    backend::AudioBackend,
    state::{PlaybackMetrics, PlaybackState},
};
use crossbeam_channel::{Receiver, Sender};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::warn;

const TICK: Duration = Duration::from_millis(33);

pub(super) enum CoreCommand {
    Load(Arc<[u8]>),
    Pause,
    Resume,
    Stop,
    SeekTo(Duration),
    SetVolume(u8),
}

pub(super) enum CoreEvent {
    EndOfStream,
    LoadFailed(String),
}

/// The dedicated playback worker. Owns the audio backend outright;
/// everything else talks to it through the command channel and the
/// shared metrics, so no state lock is ever held while the backend
/// blocks.
pub(super) struct PlayerCore {
    backend: Box<dyn AudioBackend>,
    commands: Receiver<CoreCommand>,
    events: Sender<CoreEvent>,
    metrics: Arc<PlaybackMetrics>,
    loaded: bool,
}

impl PlayerCore {
    pub fn spawn(
        backend: Box<dyn AudioBackend>,
        commands: Receiver<CoreCommand>,
        events: Sender<CoreEvent>,
        metrics: Arc<PlaybackMetrics>,
    ) -> JoinHandle<()> {
        thread::Builder::new()
            .name("playback-core".into())
            .spawn(move || {
                let mut core = PlayerCore {
                    backend,
                    commands,
                    events,
                    metrics,
                    loaded: false,
                };

                core.run();
            })
            .expect("failed to spawn playback thread")
    }

    fn run(&mut self) {
        loop {
            if !self.process_commands() {
                return;
            }
            self.check_track_end();
            self.publish_position();
            thread::sleep(TICK);
        }
    }

    /// Returns false once the command side hangs up, which is the
    /// signal to wind the thread down.
    fn process_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(cmd) => self.handle(cmd),
                Err(crossbeam_channel::TryRecvError::Empty) => return true,
                Err(crossbeam_channel::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle(&mut self, cmd: CoreCommand) {
        match cmd {
            CoreCommand::Load(data) => {
                if let Err(e) = self.backend.load(data) {
                    warn!("failed to start playback: {e}");
                    self.loaded = false;
                    self.metrics.reset();
                    self.emit(CoreEvent::LoadFailed(e.to_string()));
                    return;
                }
                self.loaded = true;
                self.metrics.set_position(Duration::ZERO);
            }
            CoreCommand::Pause => self.backend.pause(),
            CoreCommand::Resume => self.backend.resume(),
            CoreCommand::Stop => {
                self.backend.stop();
                self.loaded = false;
            }
            CoreCommand::SeekTo(pos) => {
                if let Err(e) = self.backend.seek_to(pos) {
                    warn!("seek failed: {e}");
                } else {
                    self.metrics.set_position(self.backend.position());
                }
            }
            CoreCommand::SetVolume(percent) => self.backend.set_volume(percent),
        }
    }

    // The end event fires once per loaded track
    fn check_track_end(&mut self) {
        if self.loaded && self.backend.track_ended() {
            self.loaded = false;
            self.emit(CoreEvent::EndOfStream);
        }
    }

    /// Live position is only read while playing. A paused backend
    /// holds its engine lock and must not be queried; the player
    /// answers from its pause snapshot instead.
    fn publish_position(&self) {
        if self.loaded && self.metrics.get_state() == PlaybackState::Playing {
            self.metrics.set_position(self.backend.position());
        }
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.events.send(event);
    }
}
