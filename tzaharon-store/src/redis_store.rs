//! Redis-backed store: one `GET`/`SET` of the composite record.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::time::timeout;
use tzaharon_core::AppState;

use crate::{decode, encode, StateStore, StoreError};

pub const DEFAULT_REDIS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    key: String,
    timeout: Duration,
}

impl RedisStore {
    /// Parses `url`; does not connect until the first request.
    pub fn open(url: &str, key: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            key: key.into(),
            timeout: DEFAULT_REDIS_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        timeout(self.timeout, self.client.get_multiplexed_async_connection())
            .await
            .map_err(|_| StoreError::Timeout("redis connect"))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn load(&self) -> Result<Option<AppState>, StoreError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = timeout(self.timeout, conn.get(&self.key))
            .await
            .map_err(|_| StoreError::Timeout("redis GET"))??;
        match raw {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let payload = encode(state)?;
        let mut conn = self.connection().await?;
        let _: () = timeout(self.timeout, conn.set(&self.key, payload))
            .await
            .map_err(|_| StoreError::Timeout("redis SET"))??;
        tracing::debug!(key = %self.key, "state written to redis");
        Ok(())
    }

    fn describe(&self) -> String {
        let info = self.client.get_connection_info();
        format!("redis:{}/{}", info.addr, self.key)
    }
}
