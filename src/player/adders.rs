use crate::{
    domain::{Classification, SearchResult, TaskKind, Track, LOCAL_SOURCE},
    error::{Error, Result},
    player::Player,
    playlists::TrackSelector,
};
use std::{fs, path::Path, thread};
use tracing::{info, warn};

impl Player {
    /// Read a local file, canonicalize it, and wrap it as a track
    /// named after the file.
    fn load_local_track(&self, path: &Path) -> Result<Track> {
        let data = fs::read(path)?;
        if !self.inner().converter.is_valid_audio(&data)? {
            return Err(Error::Conversion(format!("{}", path.display())));
        }
        let canonical = self.inner().converter.to_canonical(&data)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Track::new(
            name,
            LOCAL_SOURCE,
            path.to_string_lossy(),
            canonical,
        ))
    }

    pub fn enqueue_track(&self, track: Track) -> bool {
        self.inner().queue.lock().unwrap().enqueue(track)
    }

    pub fn enqueue_file(&self, path: &Path) -> Result<()> {
        let track = self.load_local_track(path)?;
        self.enqueue_track(track);
        Ok(())
    }

    /// Queue every recognizable file in the directory's first level,
    /// skipping the rest with a note in the log.
    pub fn enqueue_dir(&self, dir: &Path) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            match self.load_local_track(&entry.path()) {
                Ok(track) => {
                    self.enqueue_track(track);
                }
                Err(e) => warn!("skipping {}: {e}", entry.path().display()),
            }
        }
        Ok(())
    }

    /// Fetch a track through a registered engine, answering from the
    /// cache when the identifier was downloaded before. New payloads
    /// are canonicalized and persisted before anyone hears them.
    pub fn download_track(&self, engine_name: &str, id: &str) -> Result<Track> {
        if let Some(cached) = self.inner().cache.get(engine_name, id)? {
            info!("cache hit for {engine_name}/{id}");
            return Ok(cached);
        }

        let engine = self
            .inner()
            .engines
            .get(engine_name)
            .ok_or_else(|| Error::not_found(format!("engine {engine_name}")))?;

        info!("downloading {id} via {engine_name}");
        let (raw, title) = engine.download(id)?;
        let canonical = self.inner().converter.to_canonical(&raw)?;

        let track = Track::new(title.trim(), engine_name, id, canonical);
        self.inner().cache.put(track)
    }

    /// Download in the background, then hand the result to `deliver`.
    /// The caller observes the work only through the task tracker:
    /// cleared on success, failed in place on any error.
    fn spawn_download(
        &self,
        engine_name: &str,
        id: &str,
        deliver: impl FnOnce(&Player, Track) -> Result<()> + Send + 'static,
    ) {
        self.inner().tasks.start(id, TaskKind::Downloading);

        let player = self.clone();
        let engine_name = engine_name.to_string();
        let id = id.to_string();
        thread::spawn(move || {
            let outcome = player
                .download_track(&engine_name, &id)
                .and_then(|track| deliver(&player, track));
            match outcome {
                Ok(()) => player.inner().tasks.clear(&id),
                Err(e) => {
                    warn!("download of {id} failed: {e}");
                    player.inner().tasks.fail(&id, e);
                }
            }
        });
    }

    /// Resolve a token and play it. Every arm but `Unknown` has a
    /// playback side effect; `Unknown` instead returns search
    /// candidates for the caller to pick from.
    pub fn detect_and_play(&self, token: &str) -> Result<Vec<SearchResult>> {
        match self.classify(token) {
            Classification::LocalFile(path) => {
                info!("detected file {token}");
                self.enqueue_file(&path)?;
                self.play()?;
            }
            Classification::LocalDirectory(path) => {
                info!("detected dir {token}");
                // Possibly many conversions; let them happen behind
                // the caller's back
                let player = self.clone();
                thread::spawn(move || {
                    if let Err(e) = player.enqueue_dir(&path) {
                        warn!("queueing directory failed: {e}");
                    }
                    let _ = player.play();
                });
            }
            Classification::QueueSlot(index) => {
                info!("detected queue slot {index}");
                self.inner().queue.lock().unwrap().jump_to(index);
                self.play()?;
            }
            Classification::Playlist(name) => {
                info!("detected playlist {token}");
                self.playlist_play_all(&name)?;
            }
            Classification::Engine(engine) => {
                info!("detected engine {engine} for {token}");
                self.spawn_download(&engine, token, |player, track| {
                    player.enqueue_track(track);
                    player.play()
                });
            }
            Classification::Unknown => {
                info!("detected unknown, searching for {token}");
                return Ok(self.search(token));
            }
        }
        Ok(Vec::new())
    }

    /// Resolve a token and file it into a playlist. Same shape as
    /// `detect_and_play`, but the destination is the cache plus a
    /// membership row, and nothing starts playing.
    pub fn detect_and_add_to_playlist(
        &self,
        playlist: &str,
        token: &str,
    ) -> Result<Vec<SearchResult>> {
        if !self.inner().playlists.exists(playlist)? {
            return Err(Error::not_found(format!("playlist {playlist}")));
        }

        match self.classify(token) {
            Classification::LocalFile(path) => {
                let track = self.load_local_track(&path)?;
                self.cache_into_playlist(playlist, track)?;
            }
            Classification::LocalDirectory(path) => {
                for entry in fs::read_dir(&path)? {
                    let Ok(entry) = entry else { continue };
                    if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                        continue;
                    }
                    match self.load_local_track(&entry.path()) {
                        Ok(track) => self.cache_into_playlist(playlist, track)?,
                        Err(e) => warn!("skipping {}: {e}", entry.path().display()),
                    }
                }
            }
            Classification::QueueSlot(index) => {
                let track = {
                    let queue = self.inner().queue.lock().unwrap();
                    queue
                        .get(index)
                        .cloned()
                        .ok_or_else(|| Error::not_found(format!("queue entry {index}")))?
                };
                self.cache_into_playlist(playlist, track)?;
            }
            Classification::Playlist(source) => {
                // A playlist token folds its tracks into the target
                for track in self.inner().playlists.tracks(&source)? {
                    self.inner().playlists.add_track(playlist, track.hash)?;
                }
            }
            Classification::Engine(engine) => {
                let playlist = playlist.to_string();
                self.spawn_download(&engine, token, move |player, track| {
                    player.inner().playlists.add_track(&playlist, track.hash)
                });
            }
            Classification::Unknown => {
                info!("detected unknown, searching for {token}");
                return Ok(self.search(token));
            }
        }
        Ok(Vec::new())
    }

    fn cache_into_playlist(&self, playlist: &str, track: Track) -> Result<()> {
        let stored = self.inner().cache.put(track)?;
        self.inner().playlists.add_track(playlist, stored.hash)
    }

    // ====================
    //   PLAYLIST PLAYBACK
    // ====================

    pub fn playlist_play_all(&self, name: &str) -> Result<()> {
        for track in self.inner().playlists.tracks(name)? {
            self.enqueue_track(track);
        }
        self.play()
    }

    /// Queue one playlist entry (by position or name), point the
    /// queue at it, and play.
    pub fn playlist_play_track(&self, name: &str, target: &str) -> Result<()> {
        let selector = TrackSelector::from(target);
        let track = self.inner().playlists.select_track(name, &selector)?;
        let hash = track.hash;

        self.enqueue_track(track);
        {
            let mut queue = self.inner().queue.lock().unwrap();
            if let Some(index) = queue.index_of_hash(hash) {
                queue.jump_to(index);
            }
        }
        self.play()
    }
}
