use crate::{
    database::{queries::*, Database},
    domain::Track,
    error::Result,
};
use rusqlite::params;

impl Database {
    // =======================
    //   PLAYLIST OPERATIONS
    // =======================

    /// Fails with a constraint violation if the name is taken; playlist
    /// names are unique.
    pub(crate) fn create_playlist(&mut self, name: &str) -> Result<()> {
        self.conn.execute(CREATE_PLAYLIST, params![name])?;
        Ok(())
    }

    pub(crate) fn playlist_id(&mut self, name: &str) -> Result<Option<i64>> {
        match self
            .conn
            .query_row(GET_PLAYLIST_ID, params![name], |r| r.get(0))
        {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn playlist_names(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(GET_PLAYLIST_NAMES)?;
        let names = stmt
            .query_map([], |r| r.get(0))?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(names)
    }

    /// Removes the playlist and its membership rows. The referenced
    /// tracks stay cached.
    pub(crate) fn delete_playlist(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(DELETE_PLAYLIST_TRACKS, params![id])?;
        tx.execute(DELETE_PLAYLIST, params![id])?;
        tx.commit()?;
        Ok(())
    }

    pub(crate) fn add_track_to_playlist(&mut self, playlist_id: i64, hash: u64) -> Result<()> {
        self.conn.execute(
            ADD_TRACK_TO_PLAYLIST,
            params![playlist_id, hash.to_le_bytes()],
        )?;
        Ok(())
    }

    pub(crate) fn remove_track_from_playlist(&mut self, playlist_id: i64, hash: u64) -> Result<()> {
        self.conn.execute(
            REMOVE_TRACK_FROM_PLAYLIST,
            params![playlist_id, hash.to_le_bytes()],
        )?;
        Ok(())
    }

    pub(crate) fn playlist_tracks(&mut self, playlist_id: i64) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(GET_PLAYLIST_TRACKS)?;
        let tracks = stmt
            .query_map(params![playlist_id], |row| {
                let data: Vec<u8> = row.get("data")?;
                let duration = std::time::Duration::from_secs_f64(row.get("duration")?);
                Ok(Track::from_parts(
                    row.get::<_, String>("name")?,
                    row.get::<_, String>("source")?,
                    row.get::<_, String>("key")?,
                    data,
                    duration,
                ))
            })?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(tracks)
    }
}
