use modguard_core::request::FlagType;
use modguard_store::StoreError;

use crate::detail::ReviewState;

/// Failure of a review action.
///
/// Store failures are wrapped unchanged; the rest describe actions that are
/// not valid for the current selection or state.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("No request is selected")]
    NoSelection,

    #[error("Request {0} is not in the loaded list")]
    UnknownRequest(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: ReviewState,
        action: &'static str,
    },

    #[error("Request has no flags to toggle")]
    NoFlags,

    #[error("Request has no {0} flag")]
    FlagNotPresent(FlagType),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReviewError {
    /// True when a save lost a race with another writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReviewError::Store(err) if err.is_conflict())
    }
}
