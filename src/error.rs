use std::error::Error as StdError;

use thiserror::Error;

/// Sotto's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Sotto's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The decode backend could not be initialized or could not open a stream.
    ///
    /// Fatal for the session: the worker loop terminates and surfaces this to the caller.
    #[error("decode backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A single decode call failed.
    ///
    /// Non-fatal: the pending speech is discarded and the session continues with the
    /// next segment.
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether the session may keep running after observing this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
