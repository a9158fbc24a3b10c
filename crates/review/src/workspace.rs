//! Review workspace: the list, the open record and the store behind them.
//!
//! Every store call is made here. A failed call is logged, reported on the
//! notification bus and returned as [`ReviewError::Store`]; the local list
//! and detail are left exactly as they were before the call.

use std::sync::Arc;

use modguard_core::request::{FlagType, ModerationRequest, NewModerationRequest};
use modguard_events::{Notification, NotificationBus};
use modguard_store::SharedStore;

use crate::detail::{RequestDetail, ReviewDraft};
use crate::error::ReviewError;
use crate::list::RequestList;
use crate::session::Session;

pub struct ReviewWorkspace {
    store: SharedStore,
    notifications: Arc<NotificationBus>,
    session: Session,
    list: RequestList,
    detail: Option<RequestDetail>,
}

impl ReviewWorkspace {
    pub fn new(store: SharedStore, notifications: Arc<NotificationBus>, session: Session) -> Self {
        Self {
            store,
            notifications,
            session,
            list: RequestList::new(),
            detail: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn list(&self) -> &RequestList {
        &self.list
    }

    pub fn detail(&self) -> Option<&RequestDetail> {
        self.detail.as_ref()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.list.set_search_term(term);
    }

    pub fn visible(&self) -> Vec<&ModerationRequest> {
        self.list.visible()
    }

    // -- Store-backed operations --------------------------------------------

    /// Fetch every record from the store into the list.
    pub async fn load(&mut self) -> Result<usize, ReviewError> {
        match self.store.list().await {
            Ok(records) => {
                let count = records.len();
                if let Some(detail) = self.detail.as_mut() {
                    if let Some(fresh) = records.iter().find(|r| r.id == detail.current().id) {
                        detail.refresh(fresh.clone());
                    }
                }
                self.list.replace_all(records);
                tracing::info!(user_id = %self.session.user_id(), count, "Loaded moderation requests");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(user_id = %self.session.user_id(), error = %e, "Error fetching requests");
                self.notifications.publish(Notification::destructive(
                    "Error fetching requests",
                    "Failed to fetch moderation requests from the server.",
                ));
                Err(e.into())
            }
        }
    }

    /// Persist the open draft.
    ///
    /// On success the store's copy replaces the list entry and the detail
    /// returns to viewing. On failure the detail goes back to editing with
    /// the draft intact.
    pub async fn save(&mut self) -> Result<&ModerationRequest, ReviewError> {
        let detail = self.detail.as_mut().ok_or(ReviewError::NoSelection)?;
        let pending = detail.begin_save()?;

        tracing::info!(
            user_id = %self.session.user_id(),
            request_id = %pending.id,
            status = %pending.patch.status.as_ref().map(|s| s.as_str()).unwrap_or_default(),
            "Saving review"
        );

        match self
            .store
            .update(&pending.id, &pending.patch, Some(pending.expected_version))
            .await
        {
            Ok(updated) => {
                self.list.replace(updated.clone());
                detail.complete_save(updated)?;
                self.notifications.publish(
                    Notification::info(
                        "Request updated",
                        format!("Moderation request {} has been updated.", pending.id),
                    )
                    .with_request(&pending.id),
                );
                Ok(detail.current())
            }
            Err(e) => {
                detail.fail_save()?;
                tracing::error!(
                    user_id = %self.session.user_id(),
                    request_id = %pending.id,
                    error = %e,
                    "Error updating request"
                );
                let description = if e.is_conflict() {
                    "The moderation request was changed by someone else. Reload and try again."
                } else {
                    "Failed to update the moderation request."
                };
                self.notifications.publish(
                    Notification::destructive("Error updating request", description)
                        .with_request(&pending.id),
                );
                Err(e.into())
            }
        }
    }

    /// Permanently remove a record from the store and the list.
    pub async fn delete(&mut self, id: &str) -> Result<ModerationRequest, ReviewError> {
        match self.store.delete(id).await {
            Ok(removed) => {
                self.list.remove(id);
                if let Some(detail) = self.detail.as_mut().filter(|d| d.current().id == id) {
                    detail.mark_removed();
                }
                tracing::info!(user_id = %self.session.user_id(), request_id = %id, "Deleted request");
                self.notifications.publish(
                    Notification::info(
                        "Request deleted",
                        format!("Moderation request {id} has been deleted."),
                    )
                    .with_request(id),
                );
                Ok(removed)
            }
            Err(e) => {
                tracing::error!(
                    user_id = %self.session.user_id(),
                    request_id = %id,
                    error = %e,
                    "Error deleting request"
                );
                self.notifications.publish(
                    Notification::destructive(
                        "Error deleting request",
                        "Failed to delete the moderation request.",
                    )
                    .with_request(id),
                );
                Err(e.into())
            }
        }
    }

    /// Record an analysis verdict as a new request and append it to the list.
    pub async fn submit_analysis(
        &mut self,
        input: NewModerationRequest,
    ) -> Result<ModerationRequest, ReviewError> {
        match self.store.insert(&input).await {
            Ok(record) => {
                tracing::info!(
                    user_id = %self.session.user_id(),
                    request_id = %record.id,
                    status = %record.status,
                    "Submitted analysis"
                );
                self.notifications.publish(
                    Notification::info(
                        "Request submitted",
                        format!("Moderation request {} has been recorded.", record.id),
                    )
                    .with_request(&record.id),
                );
                self.list.push(record.clone());
                Ok(record)
            }
            Err(e) => {
                tracing::error!(user_id = %self.session.user_id(), error = %e, "Error submitting request");
                self.notifications.publish(Notification::destructive(
                    "Error submitting request",
                    "Failed to record the moderation request.",
                ));
                Err(e.into())
            }
        }
    }

    // -- Detail navigation --------------------------------------------------

    /// Open a loaded record for review, replacing any open detail.
    pub fn open(&mut self, id: &str) -> Result<&RequestDetail, ReviewError> {
        let record = self
            .list
            .get(id)
            .cloned()
            .ok_or_else(|| ReviewError::UnknownRequest(id.to_string()))?;
        tracing::debug!(request_id = %id, "Opened request");
        Ok(self.detail.insert(RequestDetail::new(record)))
    }

    fn detail_mut(&mut self) -> Result<&mut RequestDetail, ReviewError> {
        self.detail.as_mut().ok_or(ReviewError::NoSelection)
    }

    pub fn begin_edit(&mut self) -> Result<&ReviewDraft, ReviewError> {
        self.detail_mut()?.begin_edit()
    }

    pub fn toggle_flag(&mut self, kind: FlagType) -> Result<bool, ReviewError> {
        let flagged = self.detail_mut()?.toggle_flag(kind)?;
        tracing::debug!(flag = %kind.as_str(), flagged, "Toggled flag");
        Ok(flagged)
    }

    pub fn set_feedback(&mut self, text: impl Into<String>) -> Result<(), ReviewError> {
        self.detail_mut()?.set_feedback(text)
    }

    pub fn cancel_edit(&mut self) -> Result<(), ReviewError> {
        self.detail_mut()?.cancel_edit()
    }
}
