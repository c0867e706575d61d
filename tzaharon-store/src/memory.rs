//! Process-local store. State is lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tzaharon_core::AppState;

use crate::{decode, encode, StateStore, StoreError};

/// Holds the serialized record, so reads and writes go through the same
/// JSON path as the durable backends.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store.
    pub fn with_state(state: &AppState) -> Result<Self, StoreError> {
        Ok(Self {
            record: RwLock::new(Some(encode(state)?)),
        })
    }

    /// Pre-populated with a raw record, e.g. one written by an older client.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: RwLock::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<AppState>, StoreError> {
        let record = self.record.read().await;
        match record.as_deref() {
            Some(raw) => decode(raw),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let encoded = encode(state)?;
        *self.record.write().await = Some(encoded);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
