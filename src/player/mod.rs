mod adders;
mod backend;
mod classify;
mod core;
mod player;
mod queue;
mod search;
mod state;
mod tasks;

pub use backend::{AudioBackend, RodioBackend};
pub use player::{Player, Status};
pub use queue::PlaybackQueue;
pub use state::PlaybackState;
pub use tasks::TaskTracker;

#[cfg(test)]
pub(crate) mod testing {
    use super::{backend::testing::*, Player};
    use crate::{
        converter::testing::StubConverter,
        database::Database,
        engines::{testing::StubEngine, EngineRegistry},
        MusicCache, PlaylistStore,
    };
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    pub(crate) const TEST_SEARCH_TIMEOUT: Duration = Duration::from_millis(400);

    /// A player wired to stubs end to end: fake clock backend, magic
    /// byte converter, in-memory storage, one scriptable engine named
    /// "stub".
    pub(crate) fn test_player() -> Player {
        harness(|_| {}).0
    }

    pub(crate) fn test_player_with(tweak: impl FnOnce(&mut StubEngine)) -> Player {
        harness(tweak).0
    }

    pub(crate) fn harness(tweak: impl FnOnce(&mut StubEngine)) -> (Player, StubHandle) {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let cache = MusicCache::new(Arc::clone(&db));
        let playlists = PlaylistStore::new(Arc::clone(&db));

        let mut engine = StubEngine::named("stub");
        tweak(&mut engine);
        let mut engines = EngineRegistry::new();
        engines.register(Arc::new(engine));

        let (backend, handle) = StubBackend::new();
        let player = Player::new(
            Box::new(backend),
            cache,
            playlists,
            engines,
            Arc::new(StubConverter),
            TEST_SEARCH_TIMEOUT,
        );

        (player, handle)
    }
}
