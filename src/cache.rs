use crate::{database::Database, domain::Track, error::Result};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Content-addressed store of every track the daemon has ever fetched,
/// keyed by `(source, key)` and deduplicated by payload hash. All I/O
/// goes through the backing [`Database`]; the cache itself only decides
/// what gets written.
#[derive(Clone)]
pub struct MusicCache {
    db: Arc<Mutex<Database>>,
}

impl MusicCache {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        MusicCache { db }
    }

    pub fn get(&self, source: &str, key: &str) -> Result<Option<Track>> {
        self.db.lock().unwrap().get_track(source, key)
    }

    pub fn get_by_hash(&self, hash: u64) -> Result<Option<Track>> {
        self.db.lock().unwrap().get_track_by_hash(hash)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Track>> {
        self.db.lock().unwrap().get_track_by_name(name)
    }

    /// Persist a track. A payload already stored under any name wins:
    /// the existing row comes back and nothing is written. A new
    /// payload whose name collides with a stored one is suffixed
    /// `_1`, `_2`, ... before insert.
    pub fn put(&self, track: Track) -> Result<Track> {
        let mut db = self.db.lock().unwrap();

        if let Some(existing) = db.get_track_by_hash(track.hash)? {
            return Ok(existing);
        }

        let name = unique_name(&mut db, &track.name)?;
        db.insert_track(&track, &name)?;

        if name != track.name {
            info!("cached {} as {name} (name taken)", track.name);
        }

        Ok(Track { name, ..track })
    }

    /// Case-insensitive containment match on track name.
    pub fn search(&self, substring: &str) -> Result<Vec<Track>> {
        self.db.lock().unwrap().filter_tracks(substring)
    }

    /// Tracks no playlist references. These are the only eviction
    /// candidates, and nothing deletes them but `clean_orphaned`.
    pub fn orphaned(&self) -> Result<Vec<Track>> {
        self.db.lock().unwrap().orphaned_tracks()
    }

    pub fn clean_orphaned(&self) -> Result<usize> {
        let removed = self.db.lock().unwrap().delete_orphaned()?;
        info!("cache cleanup removed {removed} orphaned tracks");
        Ok(removed)
    }
}

fn unique_name(db: &mut Database, wanted: &str) -> Result<String> {
    if !db.track_name_taken(wanted)? {
        return Ok(wanted.to_string());
    }

    let mut n = 1;
    loop {
        let candidate = format!("{wanted}_{n}");
        if !db.track_name_taken(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}
