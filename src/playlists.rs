use crate::{
    database::Database,
    domain::Track,
    error::{Error, Result},
};
use std::sync::{Arc, Mutex};

/// Named, ordered collections of cache-resident tracks. Membership is
/// by payload hash, so one track can sit in any number of playlists
/// and renaming never breaks a list.
#[derive(Clone)]
pub struct PlaylistStore {
    db: Arc<Mutex<Database>>,
}

/// Selects a playlist entry either by its position or by track name.
#[derive(Clone, Debug)]
pub enum TrackSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for TrackSelector {
    fn from(raw: &str) -> Self {
        match raw.parse() {
            Ok(i) => TrackSelector::Index(i),
            Err(_) => TrackSelector::Name(raw.to_string()),
        }
    }
}

impl PlaylistStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        PlaylistStore { db }
    }

    pub fn create(&self, name: &str) -> Result<()> {
        self.db.lock().unwrap().create_playlist(name)
    }

    /// Drops the playlist and its membership rows; the cached tracks
    /// themselves stay.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let id = db
            .playlist_id(name)?
            .ok_or_else(|| Error::not_found(format!("playlist {name}")))?;
        db.delete_playlist(id)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.db.lock().unwrap().playlist_id(name)?.is_some())
    }

    pub fn names(&self) -> Result<Vec<String>> {
        self.db.lock().unwrap().playlist_names()
    }

    pub fn tracks(&self, name: &str) -> Result<Vec<Track>> {
        let mut db = self.db.lock().unwrap();
        let id = db
            .playlist_id(name)?
            .ok_or_else(|| Error::not_found(format!("playlist {name}")))?;
        db.playlist_tracks(id)
    }

    pub fn track_names(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.tracks(name)?.into_iter().map(|t| t.name).collect())
    }

    pub fn add_track(&self, name: &str, hash: u64) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let id = db
            .playlist_id(name)?
            .ok_or_else(|| Error::not_found(format!("playlist {name}")))?;
        db.add_track_to_playlist(id, hash)
    }

    pub fn select_track(&self, name: &str, selector: &TrackSelector) -> Result<Track> {
        let tracks = self.tracks(name)?;
        let found = match selector {
            TrackSelector::Index(i) => tracks.into_iter().nth(*i),
            TrackSelector::Name(n) => tracks.into_iter().find(|t| &t.name == n),
        };
        found.ok_or_else(|| Error::not_found(format!("track {selector:?} in playlist {name}")))
    }

    pub fn remove_track(&self, name: &str, selector: &TrackSelector) -> Result<()> {
        let track = self.select_track(name, selector)?;
        let mut db = self.db.lock().unwrap();
        let id = db
            .playlist_id(name)?
            .ok_or_else(|| Error::not_found(format!("playlist {name}")))?;
        db.remove_track_from_playlist(id, track.hash)
    }
}
