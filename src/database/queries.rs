pub const INSERT_TRACK: &str = "
    INSERT INTO tracks (name, source, key, data, hash, duration)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

pub const GET_TRACK: &str = "
    SELECT name, source, key, data, hash, duration
    FROM tracks
    WHERE source = ?1 AND key = ?2
";

pub const GET_TRACK_BY_HASH: &str = "
    SELECT name, source, key, data, hash, duration
    FROM tracks
    WHERE hash = ?
";

pub const GET_TRACK_BY_NAME: &str = "
    SELECT name, source, key, data, hash, duration
    FROM tracks
    WHERE name = ?
";

pub const TRACK_NAME_TAKEN: &str = "
    SELECT COUNT(*) FROM tracks WHERE name = ?
";

pub const FILTER_TRACKS: &str = "
    SELECT name, source, key, data, hash, duration
    FROM tracks
    WHERE name LIKE '%' || ? || '%'
    ORDER BY name ASC
";

pub const ORPHANED_TRACKS: &str = "
    SELECT name, source, key, data, hash, duration
    FROM tracks
    WHERE hash NOT IN (SELECT track_hash FROM playlist_tracks)
";

pub const DELETE_ORPHANED: &str = "
    DELETE FROM tracks
    WHERE hash NOT IN (SELECT track_hash FROM playlist_tracks)
";

pub const CREATE_PLAYLIST: &str = "
    INSERT INTO playlists (name) VALUES (?)
";

pub const GET_PLAYLIST_ID: &str = "
    SELECT id FROM playlists WHERE name = ?
";

pub const GET_PLAYLIST_NAMES: &str = "
    SELECT name FROM playlists ORDER BY name ASC
";

pub const DELETE_PLAYLIST: &str = "
    DELETE FROM playlists WHERE id = ?
";

pub const DELETE_PLAYLIST_TRACKS: &str = "
    DELETE FROM playlist_tracks WHERE playlist_id = ?
";

pub const ADD_TRACK_TO_PLAYLIST: &str = "
    INSERT OR IGNORE INTO playlist_tracks (playlist_id, track_hash, position)
    VALUES (
        ?1,
        ?2,
        (SELECT COALESCE(MAX(position), -1) + 1
         FROM playlist_tracks WHERE playlist_id = ?1)
    )
";

pub const REMOVE_TRACK_FROM_PLAYLIST: &str = "
    DELETE FROM playlist_tracks
    WHERE playlist_id = ?1 AND track_hash = ?2
";

pub const GET_PLAYLIST_TRACKS: &str = "
    SELECT t.name, t.source, t.key, t.data, t.hash, t.duration
    FROM tracks t
    JOIN playlist_tracks pt ON pt.track_hash = t.hash
    WHERE pt.playlist_id = ?
    ORDER BY pt.position ASC
";
