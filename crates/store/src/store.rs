//! The request store contract.

use async_trait::async_trait;
use modguard_core::request::{ModerationRequest, NewModerationRequest, RequestPatch};

use crate::error::StoreError;

/// CRUD access to the table of moderation requests.
///
/// Calls are independent; there are no transactions. Concurrent writers are
/// detected only through the `expected_version` token on [`update`].
///
/// [`update`]: RequestStore::update
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Fetch every record, in store order.
    async fn list(&self) -> Result<Vec<ModerationRequest>, StoreError>;

    /// Insert a record, returning the stored row with its assigned id.
    async fn insert(&self, input: &NewModerationRequest) -> Result<ModerationRequest, StoreError>;

    /// Apply a partial update to the record with the given id.
    ///
    /// With `Some(version)`, the update only succeeds if the stored row still
    /// carries that version; otherwise [`StoreError::Conflict`] is returned.
    /// A successful update bumps the version.
    async fn update(
        &self,
        id: &str,
        patch: &RequestPatch,
        expected_version: Option<i64>,
    ) -> Result<ModerationRequest, StoreError>;

    /// Permanently remove a record, returning the removed row.
    async fn delete(&self, id: &str) -> Result<ModerationRequest, StoreError>;
}
