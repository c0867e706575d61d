//! Blocking wrapper around a sync session for one-shot commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::runtime::Runtime;

use tzaharon_sync::{
    spawn, HttpRemote, Intent, Session, SyncConfig, SyncHandle, SyncIssue, DEFAULT_POLL_INTERVAL,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";

/// Where the server lives and how often to poll it.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Base URL of a running `tzaharon serve`.
    #[arg(long, env = "TZAHARON_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Seconds between background refreshes.
    #[arg(long, env = "TZAHARON_POLL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_secs: u64,
}

impl RemoteArgs {
    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: Duration::from_secs(self.poll_secs.max(1)),
        }
    }
}

pub struct Client {
    runtime: Runtime,
    handle: SyncHandle,
    server: String,
}

impl Client {
    /// Start syncing and wait for the first fetch.
    pub fn connect(args: &RemoteArgs) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let remote = Arc::new(HttpRemote::new(&args.server));
        let handle = {
            let _guard = runtime.enter();
            spawn(remote, args.sync_config())
        };
        let client = Self {
            runtime,
            handle,
            server: args.server.clone(),
        };

        let session = client
            .runtime
            .block_on(client.handle.settled())
            .context("sync task stopped before loading")?;
        if !session.is_loaded() {
            let reason = session
                .issue()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no response".to_string());
            bail!("cannot load board from {}: {reason}", client.server);
        }
        Ok(client)
    }

    pub fn session(&self) -> Session {
        self.handle.snapshot()
    }

    /// Apply an intent and wait until its push has been acknowledged.
    pub fn apply(&self, intent: Intent) -> Result<Session> {
        let session = self.runtime.block_on(async {
            self.handle.send(intent).await?;
            self.handle.settled().await
        })?;
        if let Some(issue @ SyncIssue::Persist(_)) = session.issue() {
            bail!("{issue} ({})", self.server);
        }
        Ok(session)
    }

    pub fn handle(&self) -> &SyncHandle {
        &self.handle
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn close(self) -> Result<()> {
        let Self {
            runtime, handle, ..
        } = self;
        runtime
            .block_on(handle.shutdown())
            .context("sync task failed")
    }
}
