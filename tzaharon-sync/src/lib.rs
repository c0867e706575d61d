//! Keeps a local copy of the board in step with a remote store.
//!
//! - [`session`]: pure reducer over poll results and user intents
//! - [`runtime`]: task that runs the reducer's fetch/push effects
//! - [`remote`]: [`Remote`] trait and the HTTP implementation

pub mod error;
pub mod remote;
pub mod runtime;
pub mod session;

pub use error::{SessionError, SyncError};
pub use remote::{HttpRemote, Remote, DATA_PATH};
pub use runtime::{spawn, SyncConfig, SyncHandle, DEFAULT_POLL_INTERVAL};
pub use session::{Effect, Intent, Message, Session, SyncIssue};
