//! Error types for tzaharon-core.

use thiserror::Error;

use crate::types::{ChildId, StatusId};

/// Rejections from the reconciliation engine and the registry editor.
///
/// A rejected mutation leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("unknown child '{0}'")]
    UnknownChild(ChildId),

    #[error("unknown status '{0}'")]
    UnknownStatus(StatusId),

    /// Save-settings payload with two statuses sharing an id.
    #[error("status id '{0}' appears more than once in the registry")]
    DuplicateStatusId(StatusId),

    #[error("status label must not be empty")]
    EmptyLabel,

    #[error("first and last name must not be empty")]
    EmptyName,

    /// `commit` called with no staged delete/reset.
    #[error("no pending action to confirm")]
    NothingPending,
}
