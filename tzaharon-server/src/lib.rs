//! HTTP front for the attendance board: one JSON route over a
//! [`StateStore`](tzaharon_store::StateStore).

pub mod api;
pub mod config;
pub mod error;
pub mod runtime;

pub use api::{build_router, load_or_seed, parse_payload, PayloadError, DATA_PATH};
pub use config::{ServerConfig, DEFAULT_BIND, DEFAULT_PORT};
pub use error::ServerError;
pub use runtime::{init_tracing, run, serve, start_blocking};
