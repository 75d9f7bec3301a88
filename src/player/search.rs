use crate::{
    domain::{SearchResult, TaskKind},
    player::Player,
};
use crossbeam_channel::RecvTimeoutError;
use std::{thread, time::Instant};
use tracing::{info, warn};

impl Player {
    /// Fan a query out to every registered engine plus the cache and
    /// gather whatever lands before the deadline. A failing engine
    /// contributes nothing and cannot take the others down with it;
    /// result order is whoever-answered-first and means nothing.
    ///
    /// While outstanding, the query is tracked as a `Searching` task:
    /// cleared the moment the first result arrives, failed if the
    /// deadline passes with nothing to show.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.inner().tasks.start(query, TaskKind::Searching);

        let (tx, rx) = crossbeam_channel::unbounded();

        for engine in self.inner().engines.iter() {
            let engine = engine.clone();
            let tx = tx.clone();
            let query = query.to_string();
            thread::spawn(move || {
                match engine.search(&query, engine.max_results()) {
                    Ok(results) => {
                        for result in results {
                            let _ = tx.send(result);
                        }
                    }
                    Err(e) => warn!("engine {} search failed: {e}", engine.name()),
                }
                info!("search worker done for {} / {query}", engine.name());
            });
        }

        {
            let cache = self.inner().cache.clone();
            let tx = tx.clone();
            let query = query.to_string();
            thread::spawn(move || match cache.search(&query) {
                Ok(tracks) => {
                    for track in &tracks {
                        let _ = tx.send(SearchResult::from_cached(track));
                    }
                }
                Err(e) => warn!("cache search failed: {e}"),
            });
        }

        // Workers own the remaining senders; the channel disconnects
        // when the last one finishes
        drop(tx);

        let deadline = Instant::now() + self.inner().search_timeout;
        let mut results = Vec::new();

        loop {
            match rx.recv_deadline(deadline) {
                Ok(result) => {
                    results.push(result);
                    self.inner().tasks.clear(query);
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("search timed out for {query}");
                    self.inner().tasks.fail(query, crate::Error::Timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // All workers done. An empty outcome is an answer
                    // too, not a dangling task
                    if results.is_empty() {
                        self.inner().tasks.clear(query);
                    }
                    break;
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Track;
    use crate::player::testing::{harness, test_player_with, TEST_SEARCH_TIMEOUT};
    use std::collections::HashSet;
    use std::time::Duration;

    fn stub_results(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                SearchResult::new(
                    format!("hit {i}"),
                    format!("dest-{i}"),
                    "stub",
                    Duration::from_secs(60),
                )
            })
            .collect()
    }

    #[test]
    fn merges_engine_and_cache_results_as_a_set() {
        let (player, _) = harness(|engine| engine.results = stub_results(2));
        player
            .inner()
            .cache
            .put(Track::new("cached raga", "test", "k", b"x".to_vec()))
            .unwrap();

        let found = player.search("raga");

        let titles: HashSet<String> = found.into_iter().map(|r| r.title).collect();
        let expected: HashSet<String> = ["hit 0", "hit 1", "cached raga"]
            .map(String::from)
            .into();
        assert_eq!(titles, expected);

        // Consumed results retired the task
        assert!(player.inner().tasks.snapshot().is_empty());
    }

    #[test]
    fn deadline_bounds_a_hung_engine() {
        let player = test_player_with(|engine| {
            engine.results = stub_results(1);
            engine.delay = Duration::from_secs(30);
        });

        let started = Instant::now();
        let found = player.search("anything");
        let elapsed = started.elapsed();

        assert!(found.is_empty());
        // Bounded by the deadline plus scheduling slop, nowhere near
        // the engine's 30s nap
        assert!(elapsed < TEST_SEARCH_TIMEOUT + Duration::from_millis(500));

        let tasks = player.inner().tasks.snapshot();
        assert_eq!(
            tasks["anything"].error.as_deref(),
            Some("search timed out")
        );
    }

    #[test]
    fn engine_failure_does_not_abort_the_call() {
        let (player, _) = harness(|engine| engine.failing = true);
        player
            .inner()
            .cache
            .put(Track::new("still found", "test", "k", b"x".to_vec()))
            .unwrap();

        let found = player.search("found");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "still found");
        assert_eq!(found[0].source, "cache");
    }

    #[test]
    fn empty_outcome_clears_the_task() {
        let player = test_player_with(|_| {});
        let found = player.search("matches nothing");

        assert!(found.is_empty());
        assert!(player.inner().tasks.snapshot().is_empty());
    }
}
