use crate::domain::{Task, TaskKind};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

/// In-flight background work, keyed by target (query string or source
/// identifier), for status reporting only; nothing ever waits on or
/// is gated by this. Successful work removes its entry; failed work
/// leaves the error visible until a retry on the same target
/// overwrites it.
#[derive(Clone, Default)]
pub struct TaskTracker {
    inner: Arc<Mutex<IndexMap<String, Task>>>,
}

impl TaskTracker {
    pub fn new() -> Self {
        TaskTracker::default()
    }

    /// Track a new operation. A target carries at most one task, so a
    /// fresh start replaces whatever was there, failed or not.
    pub fn start(&self, target: &str, kind: TaskKind) {
        self.inner
            .lock()
            .unwrap()
            .insert(target.to_string(), Task::started(kind));
    }

    /// Mark the target's task failed. A target nothing is tracking
    /// stays untracked.
    pub fn fail(&self, target: &str, error: impl ToString) {
        if let Some(task) = self.inner.lock().unwrap().get_mut(target) {
            task.error = Some(error.to_string());
        }
    }

    pub fn clear(&self, target: &str) {
        self.inner.lock().unwrap().shift_remove(target);
    }

    pub fn clear_all(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn snapshot(&self) -> IndexMap<String, Task> {
        self.inner.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let tasks = TaskTracker::new();
        tasks.start("some query", TaskKind::Searching);
        assert_eq!(tasks.snapshot().len(), 1);

        tasks.clear("some query");
        assert!(tasks.snapshot().is_empty());
    }

    #[test]
    fn failures_stay_visible_until_restarted() {
        let tasks = TaskTracker::new();
        tasks.start("video-id", TaskKind::Downloading);
        tasks.fail("video-id", "download failed");

        let snap = tasks.snapshot();
        assert_eq!(
            snap["video-id"].error.as_deref(),
            Some("download failed")
        );

        // A retry on the same target replaces the failed task
        tasks.start("video-id", TaskKind::Downloading);
        assert!(!tasks.snapshot()["video-id"].is_failed());
    }

    #[test]
    fn failing_an_untracked_target_is_a_noop() {
        let tasks = TaskTracker::new();
        tasks.fail("ghost", "whoops");
        assert!(tasks.snapshot().is_empty());
    }

    #[test]
    fn one_task_per_target() {
        let tasks = TaskTracker::new();
        tasks.start("t", TaskKind::Searching);
        tasks.start("t", TaskKind::Downloading);

        let snap = tasks.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap["t"].kind, TaskKind::Downloading);
    }
}
