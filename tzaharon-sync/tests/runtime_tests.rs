//! Sync task against an in-process remote.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rstest::rstest;
use tokio_test::{assert_err, assert_ok};
use tzaharon_core::{AppState, ChildId, Filter, StatusId};
use tzaharon_sync::{
    spawn, Intent, Remote, SessionError, SyncConfig, SyncError, SyncIssue,
};

#[derive(Default)]
struct FakeRemote {
    state: Mutex<AppState>,
    fetches: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
}

impl FakeRemote {
    fn seeded() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(AppState::seeded()),
            ..Self::default()
        })
    }

    fn stored(&self) -> AppState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remote for FakeRemote {
    async fn fetch(&self) -> Result<AppState, SyncError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SyncError::Transport("connection refused".into()));
        }
        Ok(self.stored())
    }

    async fn push(&self, state: &AppState) -> Result<(), SyncError> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(SyncError::Http {
                status: 500,
                message: "Failed to save data".into(),
            });
        }
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}

fn config() -> SyncConfig {
    SyncConfig {
        poll_interval: Duration::from_secs(3),
    }
}

#[tokio::test(start_paused = true)]
async fn first_poll_loads_remote_state() {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    let session = handle.settled().await.unwrap();
    assert!(session.is_loaded());
    assert_eq!(session.state(), &AppState::seeded());
    assert_ok!(handle.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn mutations_are_pushed() {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    handle.settled().await.unwrap();

    handle
        .send(Intent::AddChild {
            first_name: "נועה".into(),
            last_name: "ברק".into(),
        })
        .await
        .unwrap();
    let local = handle.settled().await.unwrap();
    assert_eq!(local.state().children.len(), 1);
    assert_eq!(remote.stored(), *local.state());
    assert_eq!(local.state().children[0].status_id, StatusId::from("1"));
    assert_ok!(handle.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn polling_picks_up_remote_changes() {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    handle.settled().await.unwrap();

    let mut changed = remote.stored();
    changed.statuses.create("טיול", None).unwrap();
    *remote.state.lock().unwrap() = changed.clone();

    tokio::time::sleep(Duration::from_secs(4)).await;
    let mut updates = handle.subscribe();
    let session = updates
        .wait_for(|s| s.state() == &changed)
        .await
        .map(|s| s.clone())
        .unwrap();
    assert_eq!(session.state().statuses.len(), 5);
    assert!(remote.fetches.load(Ordering::SeqCst) >= 2);
    assert_ok!(handle.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn push_failure_is_surfaced_without_rollback() {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    handle.settled().await.unwrap();
    remote.fail_push.store(true, Ordering::SeqCst);

    handle
        .send(Intent::AddChild {
            first_name: "Avi".into(),
            last_name: "Levi".into(),
        })
        .await
        .unwrap();
    let session = handle.settled().await.unwrap();
    assert_eq!(session.state().children.len(), 1);
    assert!(matches!(session.issue(), Some(SyncIssue::Persist(m)) if m.contains("Failed to save data")));
    assert!(remote.stored().children.is_empty());
    assert_ok!(handle.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn unreachable_remote_leaves_session_unloaded() {
    let remote = FakeRemote::seeded();
    remote.fail_fetch.store(true, Ordering::SeqCst);
    let handle = spawn(remote.clone(), config());
    let session = handle.settled().await.unwrap();
    assert!(!session.is_loaded());
    assert!(matches!(session.issue(), Some(SyncIssue::Fetch(_))));

    let err = assert_err!(
        handle
            .send(Intent::AddChild {
                first_name: "Avi".into(),
                last_name: "Levi".into(),
            })
            .await
    );
    assert!(matches!(err, SyncError::Session(SessionError::NotLoaded)));
    assert_ok!(handle.shutdown().await);
}

#[rstest]
#[case::unknown_child(Intent::RequestDelete(ChildId::from("ghost")))]
#[case::unknown_status(Intent::SetFilter(Filter::Status(StatusId::from("ghost"))))]
#[case::nothing_pending(Intent::Confirm)]
#[tokio::test(start_paused = true)]
async fn rejected_intents_leave_state_untouched(#[case] intent: Intent) {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    let before = handle.settled().await.unwrap();
    assert!(matches!(
        handle.send(intent).await,
        Err(SyncError::Session(SessionError::Rejected(_)))
    ));
    assert_eq!(handle.snapshot().state(), before.state());
    assert_ok!(handle.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn confirmed_reset_is_pushed() {
    let remote = FakeRemote::seeded();
    let handle = spawn(remote.clone(), config());
    handle.settled().await.unwrap();
    for name in ["Avi", "Ben"] {
        handle
            .send(Intent::AddChild {
                first_name: name.into(),
                last_name: "Tal".into(),
            })
            .await
            .unwrap();
    }
    let session = handle.settled().await.unwrap();
    for child in &session.state().children {
        handle
            .send(Intent::ChangeStatus {
                child: child.id.clone(),
                status: StatusId::from("3"),
            })
            .await
            .unwrap();
    }

    handle.send(Intent::RequestReset).await.unwrap();
    handle.send(Intent::Confirm).await.unwrap();
    handle.settled().await.unwrap();
    assert!(remote
        .stored()
        .children
        .iter()
        .all(|c| c.status_id == StatusId::from("1")));
    assert_ok!(handle.shutdown().await);
}
