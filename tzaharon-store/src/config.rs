//! Backend selection.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{FileStore, MemoryStore, RedisStore, RestKvStore, StateStore, StoreError};

/// Key the composite `{children, statuses}` record lives under.
pub const DEFAULT_DATA_KEY: &str = "daycare_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    /// `None` resolves to `<data dir>/tzaharon/<key>.json`.
    File { path: Option<PathBuf> },
    Redis { url: String },
    /// URL and token usually come from `KV_REST_API_URL` / `KV_REST_API_TOKEN`.
    RestKv {
        url: Option<String>,
        token: Option<String>,
    },
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::File { .. } => "file",
            Backend::Redis { .. } => "redis",
            Backend::RestKv { .. } => "rest-kv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub key: String,
}

impl StoreConfig {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            key: DEFAULT_DATA_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Backend::Memory)
    }
}

/// Build the configured store. Fails before any I/O on incomplete settings.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn StateStore>, StoreError> {
    if config.key.trim().is_empty() {
        return Err(StoreError::Config("data key must not be empty".to_string()));
    }
    let store: Arc<dyn StateStore> = match &config.backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::File { path: Some(path) } => Arc::new(FileStore::new(path.clone())),
        Backend::File { path: None } => {
            let root = dirs::data_dir().ok_or(StoreError::DataDirNotFound)?;
            Arc::new(FileStore::new(FileStore::path_for_key(&root, &config.key)))
        }
        Backend::Redis { url } => Arc::new(RedisStore::open(url, config.key.clone())?),
        Backend::RestKv { url, token } => {
            let (Some(url), Some(token)) = (non_empty(url), non_empty(token)) else {
                return Err(StoreError::Config(
                    "KV environment variables are not configured (KV_REST_API_URL, KV_REST_API_TOKEN)"
                        .to_string(),
                ));
            };
            Arc::new(RestKvStore::new(url, token, config.key.clone()))
        }
    };
    tracing::info!(store = %store.describe(), "state store opened");
    Ok(store)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
