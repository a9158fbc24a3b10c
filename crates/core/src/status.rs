//! Status derivation for reviewed records.
//!
//! The stored `status` column can drift from the flags: the upstream
//! pipeline writes `borderline` (and occasionally other values) that manual
//! review never produces. Derivation is therefore a pure function with a
//! two-value codomain, and anything else found in storage is treated as
//! valid but externally set.

use crate::request::{Flags, RequestStatus};

/// Derive the status a reviewer's save writes for the given flags.
///
/// Returns [`RequestStatus::Flagged`] iff at least one flag is raised and
/// [`RequestStatus::Clean`] otherwise, including when there are no flags.
/// Never returns `Borderline` or `External`.
pub fn derive_status(flags: Option<&Flags>) -> RequestStatus {
    if flags.is_some_and(Flags::any_flagged) {
        RequestStatus::Flagged
    } else {
        RequestStatus::Clean
    }
}

impl RequestStatus {
    /// Whether [`derive_status`] can produce this value.
    pub fn is_reviewer_derivable(&self) -> bool {
        matches!(self, RequestStatus::Flagged | RequestStatus::Clean)
    }

    /// Whether the stored status disagrees with what the flags imply.
    ///
    /// Externally set statuses always count as drifted.
    pub fn drifts_from(&self, flags: Option<&Flags>) -> bool {
        *self != derive_status(flags)
    }
}
