//! Hosted KV over its REST API (Vercel KV / Upstash).
//!
//! ```text
//! GET  <url>/get/<key>   -> {"result": "<json string>" | null}
//! POST <url>/set/<key>   body: <json>
//! ```
//!
//! Both calls carry `Authorization: Bearer <token>`. `ureq` is blocking, so
//! each request runs on the blocking pool.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tzaharon_core::AppState;

use crate::error::join_err;
use crate::{decode, encode, StateStore, StoreError};

pub const DEFAULT_REST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GetResponse {
    result: Option<String>,
}

#[derive(Clone)]
pub struct RestKvStore {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    key: String,
}

impl RestKvStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(DEFAULT_REST_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            key: key.into(),
        }
    }

    pub fn get_url(&self) -> String {
        format!("{}/get/{}", self.base_url, self.key)
    }

    pub fn set_url(&self) -> String {
        format!("{}/set/{}", self.base_url, self.key)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[async_trait]
impl StateStore for RestKvStore {
    async fn load(&self) -> Result<Option<AppState>, StoreError> {
        let agent = self.agent.clone();
        let url = self.get_url();
        let bearer = self.bearer();
        let response = tokio::task::spawn_blocking(move || -> Result<GetResponse, StoreError> {
            let response = agent
                .get(&url)
                .set("Authorization", &bearer)
                .set("Cache-Control", "no-store")
                .call()
                .map_err(rest_err)?;
            response
                .into_json::<GetResponse>()
                .map_err(|e| StoreError::Rest(format!("invalid response from {url}: {e}")))
        })
        .await
        .map_err(join_err)??;

        match response.result {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let payload = encode(state)?;
        let agent = self.agent.clone();
        let url = self.set_url();
        let bearer = self.bearer();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            agent
                .post(&url)
                .set("Authorization", &bearer)
                .set("Content-Type", "application/json")
                .send_string(&payload)
                .map_err(rest_err)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }

    fn describe(&self) -> String {
        format!("rest-kv:{}/{}", self.base_url, self.key)
    }
}

fn rest_err(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(code, response) => {
            StoreError::Rest(format!("{code} {}", response.status_text()))
        }
        ureq::Error::Transport(transport) => StoreError::Rest(transport.to_string()),
    }
}
