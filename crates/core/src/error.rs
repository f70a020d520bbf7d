//! Unified error types for ember.

use tokio_rusqlite::rusqlite;

/// Unified error type shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cache storage operation failed.
    #[error("cache storage error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("cache storage error: migration failed: {0}")]
    MigrationFailed(String),

    /// Header snapshot could not be encoded or decoded.
    #[error("header serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A URL could not be parsed or resolved.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Transport-level network failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// A precache manifest entry could not be installed.
    #[error("precache failed for {url}: {detail}")]
    Precache { url: String, detail: String },

    /// A response body exceeds the per-entry cache limit.
    #[error("entry too large for {url}: {size} bytes exceeds {limit}")]
    EntryTooLarge { url: String, size: usize, limit: usize },
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
