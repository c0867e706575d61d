//! Error types for tzaharon-store.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from backing-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored record is not a valid `{children, statuses}` document.
    #[error("stored state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Non-2xx response or transport failure from a KV REST endpoint.
    #[error("KV REST API error: {0}")]
    Rest(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Backend selected without the settings it needs.
    #[error("store configuration error: {0}")]
    Config(String),

    /// `dirs::data_dir()` returned `None`.
    #[error("cannot determine data directory; pass an explicit data file path")]
    DataDirNotFound,

    #[error("blocking store task failed: {0}")]
    Join(String),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn join_err(err: tokio::task::JoinError) -> StoreError {
    StoreError::Join(err.to_string())
}
