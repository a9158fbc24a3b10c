//! The record currently open for review.
//!
//! States: `Viewing -> Editing -> Saving -> (Viewing | Editing)` and
//! `Viewing -> Removed`. Entering `Editing` copies the editable fields into
//! a [`ReviewDraft`]; the current record is never mutated until a save is
//! confirmed by the store.

use std::fmt;

use modguard_core::request::{FlagType, Flags, ModerationRequest, RequestPatch};
use modguard_core::status::derive_status;

use crate::error::ReviewError;

/// Shown in view mode when a record has no feedback.
pub const FEEDBACK_PLACEHOLDER: &str = "No feedback provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Viewing,
    Editing,
    Saving,
    Removed,
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewState::Viewing => "viewing",
            ReviewState::Editing => "editing",
            ReviewState::Saving => "saving",
            ReviewState::Removed => "removed",
        })
    }
}

/// Editable copy of a record's flags and feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub flags: Option<Flags>,
    pub feedback: String,
}

impl ReviewDraft {
    fn from_record(record: &ModerationRequest) -> Self {
        Self {
            flags: record.flags.clone(),
            feedback: record.feedback.clone().unwrap_or_default(),
        }
    }

    /// The update that persists this draft.
    ///
    /// Status is always re-derived from the draft flags. An empty feedback
    /// text clears the stored feedback.
    pub fn to_patch(&self) -> RequestPatch {
        let feedback = if self.feedback.is_empty() {
            None
        } else {
            Some(self.feedback.clone())
        };

        RequestPatch {
            flags: self.flags.clone(),
            status: Some(derive_status(self.flags.as_ref())),
            feedback: Some(feedback),
        }
    }
}

/// An update handed to the store while the detail is in `Saving`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub id: String,
    pub patch: RequestPatch,
    pub expected_version: i64,
}

/// The single record under review.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    current: ModerationRequest,
    state: ReviewState,
    draft: Option<ReviewDraft>,
}

impl RequestDetail {
    pub fn new(record: ModerationRequest) -> Self {
        Self {
            current: record,
            state: ReviewState::Viewing,
            draft: None,
        }
    }

    pub fn current(&self) -> &ModerationRequest {
        &self.current
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn draft(&self) -> Option<&ReviewDraft> {
        self.draft.as_ref()
    }

    pub fn feedback_display(&self) -> &str {
        self.current
            .feedback
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(FEEDBACK_PLACEHOLDER)
    }

    fn expect_state(&self, expected: ReviewState, action: &'static str) -> Result<(), ReviewError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReviewError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn draft_mut(&mut self, action: &'static str) -> Result<&mut ReviewDraft, ReviewError> {
        self.expect_state(ReviewState::Editing, action)?;
        self.draft.as_mut().ok_or(ReviewError::InvalidTransition {
            state: self.state,
            action,
        })
    }

    /// Enter edit mode with a fresh draft of the current record.
    pub fn begin_edit(&mut self) -> Result<&ReviewDraft, ReviewError> {
        self.expect_state(ReviewState::Viewing, "edit")?;
        self.state = ReviewState::Editing;
        Ok(self.draft.insert(ReviewDraft::from_record(&self.current)))
    }

    /// Flip the draft's flag of the given kind. Returns the new value.
    pub fn toggle_flag(&mut self, kind: FlagType) -> Result<bool, ReviewError> {
        let draft = self.draft_mut("toggle a flag")?;
        let flags = draft.flags.as_mut().ok_or(ReviewError::NoFlags)?;
        flags.toggle(kind).ok_or(ReviewError::FlagNotPresent(kind))
    }

    pub fn set_feedback(&mut self, text: impl Into<String>) -> Result<(), ReviewError> {
        self.draft_mut("edit feedback")?.feedback = text.into();
        Ok(())
    }

    /// Leave edit mode, discarding every draft change.
    pub fn cancel_edit(&mut self) -> Result<(), ReviewError> {
        self.expect_state(ReviewState::Editing, "cancel")?;
        self.draft = None;
        self.state = ReviewState::Viewing;
        Ok(())
    }

    /// Move to `Saving` and produce the update to send.
    pub fn begin_save(&mut self) -> Result<PendingSave, ReviewError> {
        let patch = self.draft_mut("save")?.to_patch();
        self.state = ReviewState::Saving;
        Ok(PendingSave {
            id: self.current.id.clone(),
            patch,
            expected_version: self.current.version,
        })
    }

    /// The store accepted the save; adopt its copy of the record.
    pub fn complete_save(&mut self, updated: ModerationRequest) -> Result<(), ReviewError> {
        self.expect_state(ReviewState::Saving, "complete a save")?;
        self.current = updated;
        self.draft = None;
        self.state = ReviewState::Viewing;
        Ok(())
    }

    /// The store rejected the save; return to editing with the draft intact.
    pub fn fail_save(&mut self) -> Result<(), ReviewError> {
        self.expect_state(ReviewState::Saving, "fail a save")?;
        self.state = ReviewState::Editing;
        Ok(())
    }

    /// Swap in a freshly loaded copy while nothing is being edited.
    pub fn refresh(&mut self, record: ModerationRequest) -> bool {
        if self.state == ReviewState::Viewing && record.id == self.current.id {
            self.current = record;
            true
        } else {
            false
        }
    }

    /// The record was deleted from the store. Terminal.
    pub fn mark_removed(&mut self) {
        self.draft = None;
        self.state = ReviewState::Removed;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
