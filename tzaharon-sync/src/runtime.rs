//! Drives a [`Session`] against a [`Remote`].
//!
//! One task owns the session. Poll ticks, intents (with a reply channel) and
//! fetch/push results all funnel into its `select!` loop; effects run as
//! detached tasks that report back as messages. Results arriving after
//! shutdown are dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{SessionError, SyncError};
use crate::remote::{join_err, Remote};
use crate::session::{Effect, Intent, Message, Session};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

struct Command {
    intent: Intent,
    respond_to: oneshot::Sender<Result<(), SessionError>>,
}

/// Handle to a running sync task.
pub struct SyncHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Session>,
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<Result<(), SyncError>>,
}

/// Spawn the sync task. The first poll fires immediately.
pub fn spawn(remote: Arc<dyn Remote>, config: SyncConfig) -> SyncHandle {
    let (commands_tx, commands_rx) = mpsc::channel::<Command>(64);
    let (snapshot_tx, snapshot_rx) = watch::channel(Session::new());
    let (shutdown_tx, _) = broadcast::channel::<()>(4);
    let task = tokio::spawn(run_loop(
        remote,
        config,
        commands_rx,
        snapshot_tx,
        shutdown_tx.subscribe(),
    ));
    SyncHandle {
        commands: commands_tx,
        snapshot: snapshot_rx,
        shutdown: shutdown_tx,
        task,
    }
}

impl SyncHandle {
    /// Apply an intent. Returns once the local state reflects it; the push
    /// may still be in flight.
    pub async fn send(&self, intent: Intent) -> Result<(), SyncError> {
        let (respond_to, reply) = oneshot::channel();
        self.commands
            .send(Command { intent, respond_to })
            .await
            .map_err(|_| SyncError::Closed)?;
        reply.await.map_err(|_| SyncError::Closed)??;
        Ok(())
    }

    pub fn snapshot(&self) -> Session {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.snapshot.clone()
    }

    /// Wait until a fetch has completed (or failed) and no push is in flight.
    pub async fn settled(&self) -> Result<Session, SyncError> {
        let mut snapshot = self.snapshot.clone();
        let session = snapshot
            .wait_for(|s| (s.is_loaded() || s.issue().is_some()) && s.unsynced() == 0)
            .await
            .map_err(|_| SyncError::Closed)?;
        Ok(Session::clone(&session))
    }

    pub async fn shutdown(self) -> Result<(), SyncError> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(inner) => inner,
            Err(err) => Err(join_err("sync", err)),
        }
    }
}

async fn run_loop(
    remote: Arc<dyn Remote>,
    config: SyncConfig,
    mut commands: mpsc::Receiver<Command>,
    snapshot: watch::Sender<Session>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), SyncError> {
    let mut session = Session::new();
    let (results_tx, mut results) = mpsc::channel::<Message>(64);
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let (message, respond_to) = tokio::select! {
            _ = shutdown.recv() => break,
            _ = ticker.tick() => (Message::Tick, None),
            Some(result) = results.recv() => (result, None),
            command = commands.recv() => match command {
                Some(Command { intent, respond_to }) => (Message::Intent(intent), Some(respond_to)),
                None => break,
            },
        };

        let outcome = session.handle(message, Utc::now());
        let effects = match &outcome {
            Ok(effects) => effects.clone(),
            Err(err) => {
                tracing::debug!(error = %err, "intent rejected");
                Vec::new()
            }
        };
        for effect in effects {
            dispatch(effect, remote.clone(), results_tx.clone());
        }
        snapshot.send_replace(session.clone());
        if let Some(respond_to) = respond_to {
            let _ = respond_to.send(outcome.map(|_| ()));
        }
    }

    tracing::debug!("sync loop stopped");
    Ok(())
}

fn dispatch(effect: Effect, remote: Arc<dyn Remote>, results: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        let message = match effect {
            Effect::Fetch => Message::Fetched(remote.fetch().await.map_err(|e| e.to_string())),
            Effect::Persist(state) => {
                Message::Persisted(remote.push(&state).await.map_err(|e| e.to_string()))
            }
        };
        // Closed once the loop has stopped; the result is no longer wanted.
        let _ = results.send(message).await;
    });
}
