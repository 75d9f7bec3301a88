pub const CREATE_TABLES: &str = r"
    CREATE TABLE IF NOT EXISTS tracks(
        name TEXT UNIQUE NOT NULL,
        source TEXT NOT NULL,
        key TEXT NOT NULL,
        data BLOB NOT NULL,
        hash BLOB UNIQUE NOT NULL,
        duration REAL NOT NULL,
        PRIMARY KEY (source, key)
    );

    CREATE TABLE IF NOT EXISTS playlists(
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );

    CREATE TABLE IF NOT EXISTS playlist_tracks(
        playlist_id INTEGER NOT NULL,
        track_hash BLOB NOT NULL,
        position INTEGER NOT NULL,
        PRIMARY KEY (playlist_id, track_hash),
        FOREIGN KEY(playlist_id) REFERENCES playlists(id) ON DELETE CASCADE,
        FOREIGN KEY(track_hash) REFERENCES tracks(hash)
    );
";
