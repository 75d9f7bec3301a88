use crate::{domain::Classification, player::Player};
use rayon::prelude::*;
use std::{fs, path::Path};
use tracing::{debug, warn};

impl Player {
    /// Decide what a raw token refers to. The order is deliberate:
    /// filesystem paths win over playlist names, playlists over queue
    /// references, and only a token nothing local claims is offered
    /// to the engines. Read-only throughout.
    pub fn classify(&self, token: &str) -> Classification {
        let path = Path::new(token);
        if let Ok(meta) = fs::metadata(path) {
            // An existing path resolves here or not at all
            let class = match meta.is_dir() {
                true => match self.dir_has_audio(path) {
                    true => Classification::LocalDirectory(path.to_path_buf()),
                    false => Classification::Unknown,
                },
                false => match self.file_is_audio(path) {
                    true => Classification::LocalFile(path.to_path_buf()),
                    false => Classification::Unknown,
                },
            };
            debug!("classified {token} from filesystem");
            return class;
        }

        match self.inner().playlists.exists(token) {
            Ok(true) => return Classification::Playlist(token.to_string()),
            Ok(false) => {}
            Err(e) => warn!("playlist lookup failed for {token}: {e}"),
        }

        if let Some(index) = self.inner().queue.lock().unwrap().resolve(token) {
            return Classification::QueueSlot(index);
        }

        for engine in self.inner().engines.iter() {
            if engine.exists(token).unwrap_or(false) {
                return Classification::Engine(engine.name().to_string());
            }
        }

        Classification::Unknown
    }

    fn file_is_audio(&self, path: &Path) -> bool {
        let Ok(data) = fs::read(path) else {
            return false;
        };
        self.inner().converter.is_valid_audio(&data).unwrap_or(false)
    }

    /// One recognizable audio file anywhere in the directory's first
    /// level qualifies it. Probing shells out per file, so the
    /// candidates run in parallel.
    fn dir_has_audio(&self, dir: &Path) -> bool {
        let Ok(entries) = fs::read_dir(dir) else {
            return false;
        };

        let files: Vec<_> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .collect();

        files.par_iter().any(|path| self.file_is_audio(path))
    }
}
