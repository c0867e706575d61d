//! Where the authoritative state lives.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tzaharon_core::AppState;

use crate::error::SyncError;

pub const DATA_PATH: &str = "/api/data";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-state read and replace. Never partial.
#[async_trait]
pub trait Remote: Send + Sync + 'static {
    async fn fetch(&self) -> Result<AppState, SyncError>;
    async fn push(&self, state: &AppState) -> Result<(), SyncError>;
}

/// `GET`/`POST <base>/api/data` against a running server.
#[derive(Clone)]
pub struct HttpRemote {
    agent: ureq::Agent,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpRemote {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build();
        Self {
            agent,
            url: format!("{}{DATA_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn fetch(&self) -> Result<AppState, SyncError> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        tokio::task::spawn_blocking(move || {
            let response = agent
                .get(&url)
                .set("Cache-Control", "no-store")
                .call()
                .map_err(http_err)?;
            response
                .into_json::<AppState>()
                .map_err(|e| SyncError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| join_err("fetch", e))?
    }

    async fn push(&self, state: &AppState) -> Result<(), SyncError> {
        let payload =
            serde_json::to_string(state).map_err(|e| SyncError::Decode(e.to_string()))?;
        let agent = self.agent.clone();
        let url = self.url.clone();
        tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .set("Content-Type", "application/json")
                .send_string(&payload)
                .map_err(http_err)?;
            Ok(())
        })
        .await
        .map_err(|e| join_err("push", e))?
    }
}

/// Prefer the server's `{"error": ...}` body over the bare status line.
fn http_err(err: ureq::Error) -> SyncError {
    match err {
        ureq::Error::Status(status, response) => {
            let fallback = response.status_text().to_string();
            let message = response
                .into_json::<ErrorBody>()
                .map(|body| body.error)
                .unwrap_or(fallback);
            SyncError::Http { status, message }
        }
        ureq::Error::Transport(transport) => SyncError::Transport(transport.to_string()),
    }
}

pub(crate) fn join_err(task: &'static str, err: tokio::task::JoinError) -> SyncError {
    SyncError::Join {
        task,
        message: err.to_string(),
    }
}
