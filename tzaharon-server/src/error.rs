use std::net::SocketAddr;

use thiserror::Error;

/// Error surface for the HTTP server runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store error: {0}")]
    Store(#[from] tzaharon_store::StoreError),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error in {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(context: &'static str, source: std::io::Error) -> ServerError {
    ServerError::Io { context, source }
}
