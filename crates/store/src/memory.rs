//! In-process request store.
//!
//! Holds rows in insertion order behind a `tokio::sync::RwLock`. Mirrors the
//! hosted store's observable behavior, including version checks, so the
//! review workflow can run against it unchanged.

use async_trait::async_trait;
use modguard_core::request::{ModerationRequest, NewModerationRequest, RequestPatch};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::RequestStore;

/// Version assigned to freshly inserted rows.
const INITIAL_VERSION: i64 = 1;

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ModerationRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows, kept in the given order.
    pub fn with_records(records: Vec<ModerationRequest>) -> Self {
        Self {
            rows: RwLock::new(records),
        }
    }

    /// Copy of the current rows, in store order.
    pub async fn snapshot(&self) -> Vec<ModerationRequest> {
        self.rows.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<ModerationRequest> {
        self.rows.read().await.iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ModerationRequest>, StoreError> {
        Ok(self.snapshot().await)
    }

    async fn insert(&self, input: &NewModerationRequest) -> Result<ModerationRequest, StoreError> {
        input.validate()?;

        let record = input
            .clone()
            .into_record(uuid::Uuid::new_v4().to_string(), INITIAL_VERSION);
        self.rows.write().await.push(record.clone());

        tracing::debug!(id = %record.id, "Inserted moderation request");
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        patch: &RequestPatch,
        expected_version: Option<i64>,
    ) -> Result<ModerationRequest, StoreError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if let Some(expected) = expected_version {
            if row.version != expected {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    expected,
                });
            }
        }

        row.apply(patch);
        row.version += 1;

        tracing::debug!(id, version = row.version, "Updated moderation request");
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<ModerationRequest, StoreError> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        tracing::debug!(id, "Deleted moderation request");
        Ok(rows.remove(index))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use modguard_core::request::{ContentType, Flag, FlagType, Flags, RequestStatus};

    use super::*;

    fn new_request(content: &str) -> NewModerationRequest {
        NewModerationRequest {
            timestamp: Utc::now(),
            content_type: ContentType::Text,
            content: content.to_string(),
            flags: Some(Flags::Single(Flag::new(FlagType::Toxicity, 0.9, true))),
            status: RequestStatus::Flagged,
            feedback: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_initial_version() {
        let store = MemoryStore::new();
        let stored = store.insert(&new_request("first")).await.unwrap();

        assert!(!stored.id.is_empty());
        assert_eq!(stored.version, INITIAL_VERSION);
        assert_eq!(store.list().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = MemoryStore::new();
        let a = store.insert(&new_request("a")).await.unwrap();
        let b = store.insert(&new_request("b")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn insert_rejects_invalid_payload() {
        let store = MemoryStore::new();
        let mut bad = new_request("x");
        bad.flags = Some(Flags::Single(Flag::new(FlagType::Spam, -0.1, false)));

        assert_matches!(store.insert(&bad).await, Err(StoreError::Validation(_)));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn update_applies_patch_and_bumps_version() {
        let store = MemoryStore::new();
        let stored = store.insert(&new_request("a")).await.unwrap();

        let patch = RequestPatch {
            status: Some(RequestStatus::Clean),
            feedback: Some(Some("reviewed".into())),
            ..Default::default()
        };
        let updated = store
            .update(&stored.id, &patch, Some(stored.version))
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Clean);
        assert_eq!(updated.feedback.as_deref(), Some("reviewed"));
        assert_eq!(updated.version, stored.version + 1);
        assert_eq!(store.get(&stored.id).await, Some(updated));
    }

    #[tokio::test]
    async fn stale_version_conflicts_and_leaves_row_untouched() {
        let store = MemoryStore::new();
        let stored = store.insert(&new_request("a")).await.unwrap();
        let patch = RequestPatch {
            status: Some(RequestStatus::Clean),
            ..Default::default()
        };

        store.update(&stored.id, &patch, Some(stored.version)).await.unwrap();
        let second = store.update(&stored.id, &patch, Some(stored.version)).await;

        assert_matches!(second, Err(StoreError::Conflict { expected, .. }) if expected == stored.version);
        assert_eq!(store.get(&stored.id).await.unwrap().version, stored.version + 1);
    }

    #[tokio::test]
    async fn update_without_version_is_last_write_wins() {
        let store = MemoryStore::new();
        let stored = store.insert(&new_request("a")).await.unwrap();
        let patch = RequestPatch::default();

        store.update(&stored.id, &patch, None).await.unwrap();
        assert!(store.update(&stored.id, &patch, None).await.is_ok());
    }

    #[tokio::test]
    async fn update_and_delete_missing_id_fail() {
        let store = MemoryStore::new();
        assert_matches!(
            store.update("nope", &RequestPatch::default(), None).await,
            Err(StoreError::NotFound { id }) if id == "nope"
        );
        assert_matches!(store.delete("nope").await, Err(StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_returns_removed_row() {
        let store = MemoryStore::new();
        let stored = store.insert(&new_request("a")).await.unwrap();

        let removed = store.delete(&stored.id).await.unwrap();
        assert_eq!(removed.id, stored.id);
        assert!(store.list().await.unwrap().is_empty());
    }
}
