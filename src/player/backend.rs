use crate::error::{Error, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::{io::Cursor, sync::Arc, time::Duration};

/// The audio engine seam: decode a byte buffer into the output device
/// and drive it. One implementation talks to real hardware; tests run
/// against a stub with a fake clock.
pub trait AudioBackend: Send {
    /// Decode a canonical-format payload and start playing it from the
    /// beginning, replacing whatever was loaded.
    fn load(&mut self, data: Arc<[u8]>) -> Result<()>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    fn seek_to(&mut self, pos: Duration) -> Result<()>;

    fn position(&self) -> Duration;

    fn set_volume(&mut self, percent: u8);

    /// True once the loaded stream has drained.
    fn track_ended(&self) -> bool;
}

pub struct RodioBackend {
    sink: Sink,
    loaded: bool,
    _stream: OutputStream,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::Conversion(format!("cannot open audio output: {e}")))?;
        let sink = Sink::connect_new(stream.mixer());

        Ok(RodioBackend {
            sink,
            loaded: false,
            _stream: stream,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, data: Arc<[u8]>) -> Result<()> {
        let len = data.len() as u64;
        let source = Decoder::builder()
            .with_data(Cursor::new(data))
            .with_byte_len(len)
            .with_seekable(true)
            .with_hint("mp3")
            .build()
            .map_err(|e| Error::Conversion(e.to_string()))?;

        self.sink.clear();
        self.sink.append(source);
        self.sink.play();
        self.loaded = true;

        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.loaded = false;
    }

    fn seek_to(&mut self, pos: Duration) -> Result<()> {
        self.sink
            .try_seek(pos)
            .map_err(|e| Error::Conversion(format!("seek failed: {e}")))?;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn set_volume(&mut self, percent: u8) {
        self.sink.set_volume(f32::from(percent) / 100.0);
    }

    fn track_ended(&self) -> bool {
        self.loaded && self.sink.empty()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    /// Shared handle a test keeps to watch and poke the stub from
    /// outside the playback thread.
    #[derive(Clone, Default)]
    pub(crate) struct StubHandle {
        pub ended: Arc<AtomicBool>,
        pub loads: Arc<AtomicUsize>,
        pub clock_ms: Arc<AtomicU64>,
        pub volume: Arc<AtomicU64>,
    }

    impl StubHandle {
        pub fn finish_track(&self) {
            self.ended.store(true, Ordering::SeqCst);
        }

        pub fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    /// Backend with a synthetic clock: every position query advances
    /// it, so two consecutive live reads never agree. That is what
    /// makes the pause-snapshot behavior observable.
    pub(crate) struct StubBackend {
        handle: StubHandle,
        loaded: bool,
    }

    impl StubBackend {
        pub fn new() -> (Self, StubHandle) {
            let handle = StubHandle::default();
            (
                StubBackend {
                    handle: handle.clone(),
                    loaded: false,
                },
                handle,
            )
        }
    }

    impl AudioBackend for StubBackend {
        fn load(&mut self, _data: Arc<[u8]>) -> Result<()> {
            self.loaded = true;
            self.handle.ended.store(false, Ordering::SeqCst);
            self.handle.clock_ms.store(0, Ordering::SeqCst);
            self.handle.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) {}

        fn resume(&mut self) {}

        fn stop(&mut self) {
            self.loaded = false;
        }

        fn seek_to(&mut self, pos: Duration) -> Result<()> {
            self.handle
                .clock_ms
                .store(pos.as_millis() as u64, Ordering::SeqCst);
            Ok(())
        }

        fn position(&self) -> Duration {
            let ms = self.handle.clock_ms.fetch_add(10, Ordering::SeqCst);
            Duration::from_millis(ms)
        }

        fn set_volume(&mut self, percent: u8) {
            self.handle.volume.store(percent as u64, Ordering::SeqCst);
        }

        fn track_ended(&self) -> bool {
            self.loaded && self.handle.ended.load(Ordering::SeqCst)
        }
    }
}
