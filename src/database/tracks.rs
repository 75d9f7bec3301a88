use crate::{
    database::{queries::*, Database},
    domain::Track,
    error::Result,
};
use rusqlite::{params, Row};
use std::time::Duration;

// The hash column is not read back; `Track::from_parts` re-derives it
// from the payload, and the two always agree because the column was
// written from the same derivation.
fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
    let data: Vec<u8> = row.get("data")?;
    let duration = Duration::from_secs_f64(row.get("duration")?);

    Ok(Track::from_parts(
        row.get::<_, String>("name")?,
        row.get::<_, String>("source")?,
        row.get::<_, String>("key")?,
        data,
        duration,
    ))
}

impl Database {
    // ====================
    //   TRACK OPERATIONS
    // ====================

    pub(crate) fn insert_track(&mut self, track: &Track, name: &str) -> Result<()> {
        self.conn.execute(
            INSERT_TRACK,
            params![
                name,
                &track.source,
                &track.key,
                track.data.as_ref(),
                track.hash.to_le_bytes(),
                track.duration.as_secs_f64(),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn track_name_taken(&mut self, name: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(TRACK_NAME_TAKEN, params![name], |r| r.get(0))?;
        Ok(count > 0)
    }

    pub(crate) fn get_track(&mut self, source: &str, key: &str) -> Result<Option<Track>> {
        self.optional_track(GET_TRACK, params![source, key])
    }

    pub(crate) fn get_track_by_hash(&mut self, hash: u64) -> Result<Option<Track>> {
        self.optional_track(GET_TRACK_BY_HASH, params![hash.to_le_bytes()])
    }

    pub(crate) fn get_track_by_name(&mut self, name: &str) -> Result<Option<Track>> {
        self.optional_track(GET_TRACK_BY_NAME, params![name])
    }

    pub(crate) fn filter_tracks(&mut self, substring: &str) -> Result<Vec<Track>> {
        self.track_list(FILTER_TRACKS, params![substring])
    }

    pub(crate) fn orphaned_tracks(&mut self) -> Result<Vec<Track>> {
        self.track_list(ORPHANED_TRACKS, params![])
    }

    /// Deletes every track no playlist references. Returns how many
    /// rows went away.
    pub(crate) fn delete_orphaned(&mut self) -> Result<usize> {
        let n = self.conn.execute(DELETE_ORPHANED, [])?;
        Ok(n)
    }

    fn optional_track(
        &mut self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Track>> {
        match self.conn.query_row(sql, params, track_from_row) {
            Ok(track) => Ok(Some(track)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn track_list(&mut self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(sql)?;
        let tracks = stmt
            .query_map(params, track_from_row)?
            .filter_map(std::result::Result::ok)
            .collect();
        Ok(tracks)
    }
}
