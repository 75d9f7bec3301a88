use crate::error::{Error, Result};
use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
};

/// Detects whether a payload is audio we can play and transcodes
/// anything recognizable into the canonical format (MP3). Everything
/// behind this trait shells out, so no lock may be held across a call.
pub trait Converter: Send + Sync {
    fn is_valid_audio(&self, data: &[u8]) -> Result<bool>;

    /// Returns the payload as canonical MP3 bytes. Already-canonical
    /// input passes through untouched.
    fn to_canonical(&self, data: &[u8]) -> Result<Vec<u8>>;
}

const CANONICAL_FORMAT: &str = "mp3";

// ffprobe names container formats like "mov,mp4,m4a,3gp,3g2,mj2";
// any listed name qualifying the payload counts.
const RECOGNIZED_FORMATS: [&str; 8] = ["mp3", "flac", "wav", "ogg", "m4a", "mp4", "aac", "matroska"];

pub struct FfmpegConverter {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegConverter {
    pub fn new(ffmpeg: &str, ffprobe: &str) -> Result<Self> {
        for bin in [ffmpeg, ffprobe] {
            Command::new(bin)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(|e| Error::Conversion(format!("{bin} not found: {e}")))?;
        }

        Ok(FfmpegConverter {
            ffmpeg: ffmpeg.to_string(),
            ffprobe: ffprobe.to_string(),
        })
    }

    fn probe_format(&self, data: &[u8]) -> Result<String> {
        let out = run_with_stdin(
            Command::new(&self.ffprobe).args([
                "-v",
                "error",
                "-show_entries",
                "format=format_name",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                "-i",
                "pipe:0",
            ]),
            data,
        )?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

impl Converter for FfmpegConverter {
    fn is_valid_audio(&self, data: &[u8]) -> Result<bool> {
        let format = match self.probe_format(data) {
            Ok(f) => f,
            // ffprobe exits nonzero on payloads it cannot identify
            Err(_) => return Ok(false),
        };
        Ok(format
            .split(',')
            .any(|name| RECOGNIZED_FORMATS.contains(&name)))
    }

    fn to_canonical(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.probe_format(data)? == CANONICAL_FORMAT {
            return Ok(data.to_vec());
        }

        run_with_stdin(
            Command::new(&self.ffmpeg).args([
                "-i", "pipe:0", "-vn", "-ar", "44100", "-ac", "2", "-b:a", "192k", "-f",
                CANONICAL_FORMAT, "pipe:1",
            ]),
            data,
        )
    }
}

/// Run a command with the payload piped to stdin, returning stdout.
/// Stdin is fed from its own thread so neither pipe can fill up and
/// deadlock the child.
fn run_with_stdin(cmd: &mut Command, input: &[u8]) -> Result<Vec<u8>> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().expect("stdin was piped");
    let payload = input.to_vec();
    let writer = thread::spawn(move || {
        // The child may stop reading early; that is its call to make
        let _ = stdin.write_all(&payload);
    });

    let output = child.wait_with_output()?;
    let _ = writer.join();

    if !output.status.success() {
        return Err(Error::Conversion(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(output.stdout)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Converter stand-in: anything starting with `AUDIO` is valid,
    /// canonicalization is the identity.
    pub(crate) struct StubConverter;

    impl Converter for StubConverter {
        fn is_valid_audio(&self, data: &[u8]) -> Result<bool> {
            Ok(data.starts_with(b"AUDIO"))
        }

        fn to_canonical(&self, data: &[u8]) -> Result<Vec<u8>> {
            match data.starts_with(b"AUDIO") {
                true => Ok(data.to_vec()),
                false => Err(Error::Conversion("not stub audio".into())),
            }
        }
    }
}
