use thiserror::Error;
use tzaharon_core::ReconcileError;

/// Why the session refused an intent. Local state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] ReconcileError),

    #[error("board not loaded yet")]
    NotLoaded,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("sync task stopped")]
    Closed,

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },
}
