//! # tzaharon-store
//!
//! Backing stores for the attendance state.
//!
//! Every backend keeps registry and roster together in one record under a
//! single key and writes it in one operation, so a crash can never leave the
//! two halves disagreeing. Call [`open`] with a [`StoreConfig`] to get a
//! shared [`StateStore`].

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod redis_store;
pub mod rest_kv;

use async_trait::async_trait;
use tzaharon_core::AppState;

pub use config::{open, Backend, StoreConfig, DEFAULT_DATA_KEY};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use rest_kv::RestKvStore;

/// Whole-state read/write against one key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when nothing was ever written under the key.
    async fn load(&self) -> Result<Option<AppState>, StoreError>;

    /// Replace the record. Never partially applied.
    async fn save(&self, state: &AppState) -> Result<(), StoreError>;

    /// Short human-readable description for logs, e.g. `file:/var/lib/...`.
    fn describe(&self) -> String;
}

pub(crate) fn encode(state: &AppState) -> Result<String, StoreError> {
    Ok(serde_json::to_string(state)?)
}

/// Blank records read as "never written".
pub(crate) fn decode(raw: &str) -> Result<Option<AppState>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(raw)?))
}
