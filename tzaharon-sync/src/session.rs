//! Single-writer session state: one reducer, two message sources.
//!
//! Poll ticks and user intents both arrive as [`Message`]s and are applied in
//! arrival order. A fetch result replaces local state wholesale, so a fetch
//! that lands after an optimistic mutation overwrites it; nothing is versioned.
//! The reducer never performs I/O, it returns the [`Effect`]s to run.

use std::fmt;

use chrono::{DateTime, Utc};
use tzaharon_core::{
    apply, sorted_and_filtered, AppState, Child, ChildId, Filter, Mutation, PendingAction,
    ReconcileError, StatusId, StatusRegistry, Transition,
};

use crate::error::SessionError;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddChild {
        first_name: String,
        last_name: String,
    },
    ChangeStatus {
        child: ChildId,
        status: StatusId,
    },
    /// Stages a delete; nothing changes until [`Intent::Confirm`].
    RequestDelete(ChildId),
    EditNote {
        child: ChildId,
        note: String,
    },
    SaveSettings(StatusRegistry),
    /// Stages a reset of every child to the first status.
    RequestReset,
    Confirm,
    Cancel,
    SetFilter(Filter),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Tick,
    Intent(Intent),
    Fetched(Result<AppState, String>),
    Persisted(Result<(), String>),
}

/// I/O the runtime performs on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    Persist(AppState),
}

/// Last sync failure. Local state is kept either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssue {
    Fetch(String),
    Persist(String),
}

impl fmt::Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncIssue::Fetch(message) => write!(f, "failed to load data: {message}"),
            SyncIssue::Persist(message) => write!(f, "failed to save data: {message}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    state: AppState,
    filter: Filter,
    pending: PendingAction,
    loaded: bool,
    unsynced: usize,
    issue: Option<SyncIssue>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    /// `true` once any fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Pushes issued but not yet acknowledged.
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }

    pub fn issue(&self) -> Option<&SyncIssue> {
        self.issue.as_ref()
    }

    /// Sorted and filtered children for display.
    pub fn board(&self) -> Vec<&Child> {
        sorted_and_filtered(&self.state.children, &self.state.statuses, &self.filter)
    }

    pub fn handle(
        &mut self,
        message: Message,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, SessionError> {
        match message {
            Message::Tick => Ok(vec![Effect::Fetch]),
            Message::Intent(intent) => self.handle_intent(intent, now),
            Message::Fetched(Ok(state)) => {
                self.state = state;
                self.loaded = true;
                if matches!(self.issue, Some(SyncIssue::Fetch(_))) {
                    self.issue = None;
                }
                self.keep_filter_valid();
                Ok(Vec::new())
            }
            Message::Fetched(Err(message)) => {
                tracing::warn!(error = %message, "fetch failed, keeping last known state");
                self.issue = Some(SyncIssue::Fetch(message));
                Ok(Vec::new())
            }
            Message::Persisted(result) => {
                self.unsynced = self.unsynced.saturating_sub(1);
                match result {
                    Ok(()) => {
                        if matches!(self.issue, Some(SyncIssue::Persist(_))) {
                            self.issue = None;
                        }
                    }
                    Err(message) => {
                        tracing::warn!(error = %message, "push failed, local change kept");
                        self.issue = Some(SyncIssue::Persist(message));
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    fn handle_intent(
        &mut self,
        intent: Intent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, SessionError> {
        let mutation = match intent {
            Intent::Refresh => return Ok(vec![Effect::Fetch]),
            Intent::SetFilter(filter) => {
                if let Some(id) = filter.status() {
                    if !self.state.statuses.contains(id) {
                        return Err(ReconcileError::UnknownStatus(id.clone()).into());
                    }
                }
                self.filter = filter;
                return Ok(Vec::new());
            }
            Intent::RequestDelete(child) => {
                if self.state.child(&child).is_none() {
                    return Err(ReconcileError::UnknownChild(child).into());
                }
                self.pending.stage_delete(child);
                return Ok(Vec::new());
            }
            Intent::RequestReset => {
                self.pending.stage_reset();
                return Ok(Vec::new());
            }
            Intent::Cancel => {
                self.pending.discard();
                return Ok(Vec::new());
            }
            Intent::Confirm => {
                self.ensure_loaded()?;
                self.pending.commit()?
            }
            Intent::AddChild {
                first_name,
                last_name,
            } => Mutation::AddChild {
                id: ChildId::generate(),
                first_name,
                last_name,
            },
            Intent::ChangeStatus { child, status } => Mutation::ChangeStatus { child, status },
            Intent::EditNote { child, note } => Mutation::EditNote { child, note },
            Intent::SaveSettings(registry) => Mutation::SaveSettings(registry),
        };
        self.commit(mutation, now)
    }

    /// Apply locally right away and ask for a push. No rollback on push failure.
    fn commit(&mut self, mutation: Mutation, now: DateTime<Utc>) -> Result<Vec<Effect>, SessionError> {
        self.ensure_loaded()?;
        let name = mutation.name();
        match apply(&self.state, mutation, now)? {
            Transition::Applied(next) => {
                self.state = next;
                self.keep_filter_valid();
                self.unsynced += 1;
                tracing::debug!(mutation = name, "applied locally");
                Ok(vec![Effect::Persist(self.state.clone())])
            }
            Transition::Skipped(reason) => {
                tracing::debug!(mutation = name, ?reason, "mutation skipped");
                Ok(Vec::new())
            }
        }
    }

    // An unloaded session would push an empty board over the real one.
    fn ensure_loaded(&self) -> Result<(), SessionError> {
        if self.loaded {
            Ok(())
        } else {
            Err(SessionError::NotLoaded)
        }
    }

    fn keep_filter_valid(&mut self) {
        if let Some(id) = self.filter.status() {
            if !self.state.statuses.contains(id) {
                tracing::debug!(status = %id, "filtered status removed, showing all");
                self.filter = Filter::All;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tzaharon_core::Status;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
    }

    fn child(id: &str, first: &str, status: &str) -> Child {
        Child {
            id: ChildId::from(id),
            first_name: first.into(),
            last_name: "Levi".into(),
            status_id: StatusId::from(status),
            notes: None,
            last_updated: None,
        }
    }

    fn loaded(children: Vec<Child>) -> Session {
        let mut session = Session::new();
        let state = AppState {
            children,
            statuses: StatusRegistry::defaults(),
        };
        session.handle(Message::Fetched(Ok(state)), now()).unwrap();
        session
    }

    fn intent(session: &mut Session, intent: Intent) -> Result<Vec<Effect>, SessionError> {
        session.handle(Message::Intent(intent), now())
    }

    #[test]
    fn tick_and_refresh_fetch() {
        let mut session = Session::new();
        assert_eq!(session.handle(Message::Tick, now()), Ok(vec![Effect::Fetch]));
        assert_eq!(intent(&mut session, Intent::Refresh), Ok(vec![Effect::Fetch]));
    }

    #[test]
    fn mutation_before_first_load_is_refused() {
        let mut session = Session::new();
        let result = intent(
            &mut session,
            Intent::AddChild {
                first_name: "Avi".into(),
                last_name: "Levi".into(),
            },
        );
        assert_eq!(result, Err(SessionError::NotLoaded));
    }

    #[test]
    fn mutation_is_optimistic_and_persisted() {
        let mut session = loaded(vec![child("c1", "Avi", "1")]);
        let effects = intent(
            &mut session,
            Intent::ChangeStatus {
                child: ChildId::from("c1"),
                status: StatusId::from("2"),
            },
        )
        .unwrap();
        assert_eq!(session.state().children[0].status_id, StatusId::from("2"));
        assert_eq!(session.state().children[0].last_updated, Some(now()));
        assert_eq!(effects, vec![Effect::Persist(session.state().clone())]);
        assert_eq!(session.unsynced(), 1);
    }

    #[test]
    fn push_failure_keeps_local_change_and_surfaces_issue() {
        let mut session = loaded(vec![child("c1", "Avi", "1")]);
        intent(
            &mut session,
            Intent::EditNote {
                child: ChildId::from("c1"),
                note: "pickup 16:00".into(),
            },
        )
        .unwrap();
        session
            .handle(Message::Persisted(Err("500 Failed to save data".into())), now())
            .unwrap();
        assert_eq!(session.state().children[0].notes.as_deref(), Some("pickup 16:00"));
        assert_eq!(
            session.issue(),
            Some(&SyncIssue::Persist("500 Failed to save data".into()))
        );
        assert_eq!(session.unsynced(), 0);
    }

    #[test]
    fn fetch_success_keeps_push_failure() {
        let mut session = loaded(vec![child("c1", "Avi", "1")]);
        session
            .handle(Message::Persisted(Err("500 Failed to save data".into())), now())
            .unwrap();
        let state = session.state().clone();
        session.handle(Message::Fetched(Ok(state)), now()).unwrap();
        assert_eq!(
            session.issue(),
            Some(&SyncIssue::Persist("500 Failed to save data".into()))
        );
    }

    #[test]
    fn fetch_failure_keeps_last_known_state_until_next_success() {
        let mut session = loaded(vec![child("c1", "Avi", "1")]);
        let before = session.state().clone();
        session
            .handle(Message::Fetched(Err("connection refused".into())), now())
            .unwrap();
        assert_eq!(session.state(), &before);
        assert!(matches!(session.issue(), Some(SyncIssue::Fetch(_))));

        session.handle(Message::Fetched(Ok(before)), now()).unwrap();
        assert_eq!(session.issue(), None);
    }

    #[test]
    fn late_fetch_overwrites_optimistic_update() {
        let mut session = loaded(vec![child("c1", "Avi", "1")]);
        let stale = session.state().clone();
        intent(
            &mut session,
            Intent::ChangeStatus {
                child: ChildId::from("c1"),
                status: StatusId::from("3"),
            },
        )
        .unwrap();
        session.handle(Message::Fetched(Ok(stale.clone())), now()).unwrap();
        assert_eq!(session.state(), &stale);
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut session = loaded(vec![child("c1", "Avi", "1"), child("c2", "Ben", "1")]);
        let effects = intent(&mut session, Intent::RequestDelete(ChildId::from("c1"))).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.state().children.len(), 2);
        assert_eq!(session.pending(), &PendingAction::Delete(ChildId::from("c1")));

        let effects = intent(&mut session, Intent::Confirm).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(session.state().children.len(), 1);
        assert_eq!(session.pending(), &PendingAction::None);
    }

    #[test]
    fn cancel_discards_pending_reset() {
        let mut session = loaded(vec![child("c1", "Avi", "3")]);
        intent(&mut session, Intent::RequestReset).unwrap();
        intent(&mut session, Intent::Cancel).unwrap();
        assert_eq!(
            intent(&mut session, Intent::Confirm),
            Err(SessionError::Rejected(ReconcileError::NothingPending))
        );
        assert_eq!(session.state().children[0].status_id, StatusId::from("3"));
    }

    #[test]
    fn request_delete_of_unknown_child_is_rejected() {
        let mut session = loaded(Vec::new());
        assert_eq!(
            intent(&mut session, Intent::RequestDelete(ChildId::from("ghost"))),
            Err(SessionError::Rejected(ReconcileError::UnknownChild(
                ChildId::from("ghost")
            )))
        );
        assert!(!session.pending().is_pending());
    }

    #[test]
    fn filter_falls_back_when_its_status_is_removed() {
        let mut session = loaded(vec![child("c1", "Avi", "2"), child("c2", "Ben", "1")]);
        intent(&mut session, Intent::SetFilter(Filter::Status(StatusId::from("2")))).unwrap();
        assert_eq!(session.board().len(), 1);

        let without_gate = StatusRegistry::new(
            StatusRegistry::defaults()
                .iter()
                .filter(|s| s.id != StatusId::from("2"))
                .cloned()
                .collect::<Vec<Status>>(),
        );
        intent(&mut session, Intent::SaveSettings(without_gate)).unwrap();
        assert_eq!(session.filter(), &Filter::All);
        assert_eq!(session.board().len(), 2);
        assert!(session
            .state()
            .children
            .iter()
            .all(|c| c.status_id == StatusId::from("1")));
    }

    #[test]
    fn filter_on_unknown_status_is_rejected() {
        let mut session = loaded(Vec::new());
        assert!(intent(&mut session, Intent::SetFilter(Filter::Status(StatusId::from("99")))).is_err());
        assert_eq!(session.filter(), &Filter::All);
    }

    #[test]
    fn skipped_mutation_emits_nothing() {
        let mut session = Session::new();
        session
            .handle(Message::Fetched(Ok(AppState::default())), now())
            .unwrap();
        let effects = intent(
            &mut session,
            Intent::AddChild {
                first_name: "Avi".into(),
                last_name: "Levi".into(),
            },
        )
        .unwrap();
        assert!(effects.is_empty());
        assert!(session.state().children.is_empty());
        assert_eq!(session.unsynced(), 0);
    }
}
