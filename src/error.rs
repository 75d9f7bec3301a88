use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0} requires an active queue")]
    ResourceBusy(&'static str),

    #[error("engine {engine}: {reason}")]
    Engine { engine: String, reason: String },

    #[error("payload is not recognizable audio: {0}")]
    Conversion(String),

    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("search timed out")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn engine(engine: impl Into<String>, reason: impl ToString) -> Self {
        Error::Engine {
            engine: engine.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }
}
