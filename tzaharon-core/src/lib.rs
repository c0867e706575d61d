//! Tzaharon core library: attendance domain types and reconciliation rules.
//!
//! Public API surface:
//! - [`types`]: ids, [`Status`], [`Child`], [`AppState`]
//! - [`registry`]: ordered [`StatusRegistry`] and its editing operations
//! - [`reconcile`]: [`apply`] a [`Mutation`] to get the next state
//! - [`pending`]: confirm-before-mutate [`PendingAction`]
//! - [`view`]: sorted/filtered board and per-status [`tally`]
//! - [`error`]: [`ReconcileError`]
//!
//! Nothing here performs I/O.

pub mod error;
pub mod pending;
pub mod reconcile;
pub mod registry;
pub mod types;
pub mod view;

pub use error::ReconcileError;
pub use pending::PendingAction;
pub use reconcile::{apply, reassign_orphans, Mutation, SkipReason, Transition};
pub use registry::{Direction, StatusField, StatusRegistry};
pub use types::{
    AppState, Child, ChildId, Status, StatusId, StatusKind, ABSENT_LABEL, NEW_STATUS_COLOR,
    STATUS_COLORS,
};
pub use view::{sorted_and_filtered, tally, Filter, NameCollator, StatusCount, Tally};
