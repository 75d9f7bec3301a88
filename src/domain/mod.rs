mod classification;
mod search_result;
mod task;
mod track;

pub use classification::Classification;
pub use search_result::SearchResult;
pub use task::{Task, TaskKind};
pub use track::Track;

/// Source label for tracks ingested from the local filesystem rather
/// than an online engine.
pub const LOCAL_SOURCE: &str = "local";

/// Source label the aggregator attaches to results served from cache.
pub const CACHE_SOURCE: &str = "cache";
