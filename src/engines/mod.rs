mod youtube;

pub use youtube::YoutubeEngine;

use crate::{domain::SearchResult, error::Result};
use std::{collections::HashMap, sync::Arc};

/// One pluggable online catalog. Implementations block (subprocesses,
/// network), so callers must never invoke them with a lock held.
pub trait SourceEngine: Send + Sync {
    fn name(&self) -> &str;

    fn max_results(&self) -> usize {
        10
    }

    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;

    /// Fetch the audio for an identifier. Returns the raw payload and
    /// the catalog's title for it.
    fn download(&self, id: &str) -> Result<(Vec<u8>, String)>;

    fn exists(&self, id: &str) -> Result<bool>;
}

/// The set of registered engines, keyed by name. New sources plug in
/// here; nothing downstream enumerates concrete types.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn SourceEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        EngineRegistry::default()
    }

    pub fn register(&mut self, engine: Arc<dyn SourceEngine>) {
        self.engines.insert(engine.name().to_string(), engine);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceEngine>> {
        self.engines.get(name).cloned()
    }

    /// Iteration order is map order; nothing may rely on it.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SourceEngine>> {
        self.engines.values()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::time::Duration;

    /// Scriptable engine for classifier/aggregator/player tests.
    pub(crate) struct StubEngine {
        pub name: String,
        pub results: Vec<SearchResult>,
        pub known_ids: Vec<String>,
        pub payload: Vec<u8>,
        pub delay: Duration,
        pub failing: bool,
    }

    impl StubEngine {
        pub fn named(name: &str) -> Self {
            StubEngine {
                name: name.to_string(),
                results: Vec::new(),
                known_ids: Vec::new(),
                payload: b"AUDIO stub payload".to_vec(),
                delay: Duration::ZERO,
                failing: false,
            }
        }
    }

    impl SourceEngine for StubEngine {
        fn name(&self) -> &str {
            &self.name
        }

        fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
            std::thread::sleep(self.delay);
            if self.failing {
                return Err(crate::Error::engine(&self.name, "stub search failure"));
            }
            Ok(self.results.iter().take(max_results).cloned().collect())
        }

        fn download(&self, id: &str) -> Result<(Vec<u8>, String)> {
            std::thread::sleep(self.delay);
            if self.failing {
                return Err(crate::Error::engine(&self.name, "stub download failure"));
            }
            Ok((self.payload.clone(), format!("{id} (title)")))
        }

        fn exists(&self, id: &str) -> Result<bool> {
            Ok(self.known_ids.iter().any(|k| k.as_str() == id))
        }
    }
}
