use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Searching,
    Downloading,
}

/// An in-flight background operation, keyed by its target (a query
/// string or a source identifier). Successful tasks disappear; failed
/// ones keep their error until a new attempt on the same target
/// replaces them, so a status observer can see what went wrong.
#[derive(Clone, Debug, Serialize)]
pub struct Task {
    pub kind: TaskKind,
    pub error: Option<String>,
}

impl Task {
    pub fn started(kind: TaskKind) -> Self {
        Task { kind, error: None }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
