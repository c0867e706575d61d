//! Reconciliation engine: next state from current state + mutation intent.
//!
//! [`apply`] is pure. It never mutates its input, and the returned state is
//! complete: registry replacement and child reassignment happen in one step,
//! so no caller can observe a child pointing at a removed status.

use chrono::{DateTime, Utc};

use crate::error::ReconcileError;
use crate::registry::StatusRegistry;
use crate::types::{AppState, Child, ChildId, StatusId};

/// A user intent that changes persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `id` is chosen by the caller so `apply` stays deterministic.
    AddChild {
        id: ChildId,
        first_name: String,
        last_name: String,
    },
    ChangeStatus {
        child: ChildId,
        status: StatusId,
    },
    /// Only reachable through a confirmed [`crate::PendingAction`].
    DeleteChild(ChildId),
    /// An empty note clears it.
    EditNote {
        child: ChildId,
        note: String,
    },
    SaveSettings(StatusRegistry),
    /// Only reachable through a confirmed [`crate::PendingAction`].
    ResetAll,
}

impl Mutation {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Mutation::DeleteChild(_) | Mutation::ResetAll)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddChild { .. } => "add_child",
            Mutation::ChangeStatus { .. } => "change_status",
            Mutation::DeleteChild(_) => "delete_child",
            Mutation::EditNote { .. } => "edit_note",
            Mutation::SaveSettings(_) => "save_settings",
            Mutation::ResetAll => "reset_all",
        }
    }
}

/// Why a well-formed mutation left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Add child / reset need a default status and the registry has none.
    EmptyRegistry,
}

/// Result of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied(AppState),
    Skipped(SkipReason),
}

impl Transition {
    pub fn into_state(self) -> Option<AppState> {
        match self {
            Transition::Applied(state) => Some(state),
            Transition::Skipped(_) => None,
        }
    }
}

/// Compute the state that results from `mutation`.
///
/// `now` stamps `last_updated` on status changes, resets and new children.
pub fn apply(
    state: &AppState,
    mutation: Mutation,
    now: DateTime<Utc>,
) -> Result<Transition, ReconcileError> {
    match mutation {
        Mutation::AddChild {
            id,
            first_name,
            last_name,
        } => {
            let first_name = first_name.trim().to_string();
            let last_name = last_name.trim().to_string();
            if first_name.is_empty() || last_name.is_empty() {
                return Err(ReconcileError::EmptyName);
            }
            let Some(status_id) = state.statuses.default_status_id() else {
                return Ok(Transition::Skipped(SkipReason::EmptyRegistry));
            };
            let mut next = state.clone();
            next.children.push(Child {
                id,
                first_name,
                last_name,
                status_id: status_id.clone(),
                notes: None,
                last_updated: Some(now),
            });
            Ok(Transition::Applied(next))
        }

        Mutation::ChangeStatus { child, status } => {
            if !state.statuses.contains(&status) {
                return Err(ReconcileError::UnknownStatus(status));
            }
            let mut next = state.clone();
            let target = find_child_mut(&mut next, &child)?;
            target.status_id = status;
            target.last_updated = Some(now);
            Ok(Transition::Applied(next))
        }

        Mutation::DeleteChild(child) => {
            if state.child(&child).is_none() {
                return Err(ReconcileError::UnknownChild(child));
            }
            let mut next = state.clone();
            next.children.retain(|c| c.id != child);
            Ok(Transition::Applied(next))
        }

        Mutation::EditNote { child, note } => {
            let mut next = state.clone();
            let target = find_child_mut(&mut next, &child)?;
            target.notes = if note.trim().is_empty() {
                None
            } else {
                Some(note)
            };
            Ok(Transition::Applied(next))
        }

        Mutation::SaveSettings(registry) => {
            if let Some(dup) = registry.duplicate_id() {
                return Err(ReconcileError::DuplicateStatusId(dup.clone()));
            }
            let children = reassign_orphans(&state.children, &registry);
            Ok(Transition::Applied(AppState {
                children,
                statuses: registry,
            }))
        }

        Mutation::ResetAll => {
            let Some(status_id) = state.statuses.default_status_id() else {
                return Ok(Transition::Skipped(SkipReason::EmptyRegistry));
            };
            let mut next = state.clone();
            for child in &mut next.children {
                child.status_id = status_id.clone();
                child.last_updated = Some(now);
            }
            Ok(Transition::Applied(next))
        }
    }
}

/// Point every child whose status is not in `registry` at the registry's
/// first status. With an empty registry the sentinel is an empty id.
///
/// Children whose status survives keep it, even if it was relabeled.
pub fn reassign_orphans(children: &[Child], registry: &StatusRegistry) -> Vec<Child> {
    let surviving = registry.ids();
    let fallback = registry
        .default_status_id()
        .cloned()
        .unwrap_or_else(|| StatusId::from(""));
    children
        .iter()
        .map(|child| {
            if surviving.contains(&child.status_id) {
                child.clone()
            } else {
                Child {
                    status_id: fallback.clone(),
                    ..child.clone()
                }
            }
        })
        .collect()
}

fn find_child_mut<'a>(state: &'a mut AppState, id: &ChildId) -> Result<&'a mut Child, ReconcileError> {
    state
        .children
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(|| ReconcileError::UnknownChild(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn state_with_child() -> AppState {
        AppState {
            children: vec![Child {
                id: ChildId::from("c1"),
                first_name: "Avi".into(),
                last_name: "Levi".into(),
                status_id: StatusId::from("2"),
                notes: Some("allergic to nuts".into()),
                last_updated: None,
            }],
            statuses: StatusRegistry::defaults(),
        }
    }

    #[test]
    fn add_child_gets_first_status_and_timestamp() {
        let state = AppState::seeded();
        let next = apply(
            &state,
            Mutation::AddChild {
                id: ChildId::from("n1"),
                first_name: " Noa ".into(),
                last_name: "Bar".into(),
            },
            t0(),
        )
        .expect("apply")
        .into_state()
        .expect("applied");
        let child = next.child(&ChildId::from("n1")).expect("added");
        assert_eq!(child.first_name, "Noa");
        assert_eq!(child.status_id, StatusId::from("1"));
        assert_eq!(child.last_updated, Some(t0()));
        assert!(state.children.is_empty(), "input untouched");
    }

    #[test]
    fn add_child_rejects_blank_names() {
        let err = apply(
            &AppState::seeded(),
            Mutation::AddChild {
                id: ChildId::from("n1"),
                first_name: "Noa".into(),
                last_name: "".into(),
            },
            t0(),
        )
        .unwrap_err();
        assert_eq!(err, ReconcileError::EmptyName);
    }

    #[test]
    fn change_status_to_unknown_status_is_rejected() {
        let err = apply(
            &state_with_child(),
            Mutation::ChangeStatus {
                child: ChildId::from("c1"),
                status: StatusId::from("nope"),
            },
            t0(),
        )
        .unwrap_err();
        assert_eq!(err, ReconcileError::UnknownStatus(StatusId::from("nope")));
    }

    #[test]
    fn edit_note_blank_clears() {
        let next = apply(
            &state_with_child(),
            Mutation::EditNote {
                child: ChildId::from("c1"),
                note: "  ".into(),
            },
            t0(),
        )
        .expect("apply")
        .into_state()
        .expect("applied");
        assert_eq!(next.children[0].notes, None);
        assert_eq!(next.children[0].last_updated, None, "notes do not stamp");
    }

    #[test]
    fn delete_unknown_child_is_rejected() {
        let err = apply(
            &state_with_child(),
            Mutation::DeleteChild(ChildId::from("ghost")),
            t0(),
        )
        .unwrap_err();
        assert_eq!(err, ReconcileError::UnknownChild(ChildId::from("ghost")));
    }

    #[test]
    fn save_settings_rejects_duplicate_ids() {
        let registry = StatusRegistry::new(vec![
            Status::new("x", "X", "c"),
            Status::new("x", "Y", "c"),
        ]);
        let err = apply(&state_with_child(), Mutation::SaveSettings(registry), t0()).unwrap_err();
        assert_eq!(err, ReconcileError::DuplicateStatusId(StatusId::from("x")));
    }

    #[test]
    fn reassign_to_empty_sentinel_when_registry_empty() {
        let state = state_with_child();
        let children = reassign_orphans(&state.children, &StatusRegistry::default());
        assert_eq!(children[0].status_id, StatusId::from(""));
    }

    #[test]
    fn confirmation_required_only_for_delete_and_reset() {
        assert!(Mutation::ResetAll.requires_confirmation());
        assert!(Mutation::DeleteChild(ChildId::from("c")).requires_confirmation());
        assert!(!Mutation::SaveSettings(StatusRegistry::default()).requires_confirmation());
    }
}
