//! Confirm-before-mutate.
//!
//! Deleting a child and resetting every status are staged first and only
//! turned into a [`Mutation`] by an explicit [`PendingAction::commit`].
//! Staging a new request replaces whatever was staged before.

use crate::error::ReconcileError;
use crate::reconcile::Mutation;
use crate::types::ChildId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingAction {
    #[default]
    None,
    Delete(ChildId),
    Reset,
}

impl PendingAction {
    pub fn stage_delete(&mut self, child: ChildId) {
        *self = PendingAction::Delete(child);
    }

    pub fn stage_reset(&mut self) {
        *self = PendingAction::Reset;
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, PendingAction::None)
    }

    /// Take the staged action as a mutation, leaving nothing pending.
    pub fn commit(&mut self) -> Result<Mutation, ReconcileError> {
        match std::mem::take(self) {
            PendingAction::None => Err(ReconcileError::NothingPending),
            PendingAction::Delete(child) => Ok(Mutation::DeleteChild(child)),
            PendingAction::Reset => Ok(Mutation::ResetAll),
        }
    }

    /// Drop the staged action. Returns `true` if something was staged.
    pub fn discard(&mut self) -> bool {
        let was_pending = self.is_pending();
        *self = PendingAction::None;
        was_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_delete_yields_mutation_and_clears() {
        let mut pending = PendingAction::default();
        pending.stage_delete(ChildId::from("c1"));
        assert!(pending.is_pending());
        assert_eq!(
            pending.commit(),
            Ok(Mutation::DeleteChild(ChildId::from("c1")))
        );
        assert_eq!(pending, PendingAction::None);
    }

    #[test]
    fn commit_with_nothing_staged_fails() {
        let mut pending = PendingAction::default();
        assert_eq!(pending.commit(), Err(ReconcileError::NothingPending));
    }

    #[test]
    fn discard_drops_staged_reset() {
        let mut pending = PendingAction::default();
        pending.stage_reset();
        assert!(pending.discard());
        assert!(!pending.discard());
        assert_eq!(pending.commit(), Err(ReconcileError::NothingPending));
    }

    #[test]
    fn staging_replaces_previous_request() {
        let mut pending = PendingAction::default();
        pending.stage_delete(ChildId::from("c1"));
        pending.stage_reset();
        assert_eq!(pending.commit(), Ok(Mutation::ResetAll));
    }
}
