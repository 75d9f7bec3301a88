use std::path::PathBuf;

/// What a raw user token refers to. Produced by the classifier in a
/// fixed priority order: filesystem, then playlists, then the queue,
/// then the registered engines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    LocalFile(PathBuf),
    LocalDirectory(PathBuf),
    QueueSlot(usize),
    Playlist(String),
    Engine(String),
    Unknown,
}
