//! Moderation-request review workflow.
//!
//! - [`RequestList`] holds the loaded records and the client-side search.
//! - [`RequestDetail`] is the single "current" record under review with its
//!   view/edit state machine and draft.
//! - [`ReviewWorkspace`] binds both to a request store, a notification bus
//!   and the signed-in reviewer's [`Session`].
//! - [`SessionCache`] owns sign-in state with explicit login/logout.

pub mod detail;
pub mod error;
pub mod list;
pub mod session;
pub mod workspace;

pub use detail::{PendingSave, RequestDetail, ReviewDraft, ReviewState};
pub use error::ReviewError;
pub use list::RequestList;
pub use session::{Plan, Session, SessionCache, SessionError, User};
pub use workspace::ReviewWorkspace;
