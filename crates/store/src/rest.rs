//! PostgREST client for the hosted request table.
//!
//! Speaks the Supabase REST dialect: rows are filtered with `column=eq.value`
//! query parameters and mutations ask for the affected rows back with
//! `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use modguard_core::request::{ModerationRequest, NewModerationRequest, RequestPatch};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::ExposeSecret;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::RequestStore;

const PREFER_REPRESENTATION: &str = "return=representation";

/// HTTP client for one hosted request table.
pub struct RestStore {
    client: reqwest::Client,
    config: StoreConfig,
    endpoint: String,
}

impl RestStore {
    /// Build a client for the configured table.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    /// Build a store reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: StoreConfig) -> Self {
        let endpoint = format!("{}/rest/v1/{}", config.url, config.table);
        Self {
            client,
            config,
            endpoint,
        }
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let key = self.config.api_key.expose_secret();
        self.client
            .request(method, &self.endpoint)
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Check the status and return the response body.
    async fn read_body(response: Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Request store returned an error");
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Check the status and decode a JSON array of rows.
    async fn parse_rows(response: Response) -> Result<Vec<ModerationRequest>, StoreError> {
        Ok(serde_json::from_str(&Self::read_body(response).await?)?)
    }

    /// Whether a row with this id currently exists.
    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;
        Ok(!Self::parse_rows(response).await?.is_empty())
    }
}

#[async_trait]
impl RequestStore for RestStore {
    async fn list(&self) -> Result<Vec<ModerationRequest>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*")])
            .send()
            .await?;

        let raw: Vec<serde_json::Value> = serde_json::from_str(&Self::read_body(response).await?)?;
        let rows = decode_listed(raw);
        tracing::debug!(count = rows.len(), table = %self.config.table, "Listed moderation requests");
        Ok(rows)
    }

    async fn insert(&self, input: &NewModerationRequest) -> Result<ModerationRequest, StoreError> {
        input.validate()?;

        let response = self
            .request(Method::POST)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(input)
            .send()
            .await?;

        let status = response.status().as_u16();
        let row = Self::parse_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Api {
                status,
                body: "insert returned no rows".to_string(),
            })?;

        tracing::debug!(id = %row.id, "Inserted moderation request");
        Ok(row)
    }

    async fn update(
        &self,
        id: &str,
        patch: &RequestPatch,
        expected_version: Option<i64>,
    ) -> Result<ModerationRequest, StoreError> {
        let expected_version = expected_version.filter(|_| self.config.optimistic_locking);

        let mut body = serde_json::to_value(patch)?;
        let mut filters = vec![("id", format!("eq.{id}"))];
        if let Some(version) = expected_version {
            body["version"] = serde_json::json!(version + 1);
            filters.push(("version", format!("eq.{version}")));
        }

        let response = self
            .request(Method::PATCH)
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&filters)
            .json(&body)
            .send()
            .await?;

        if let Some(row) = Self::parse_rows(response).await?.into_iter().next() {
            tracing::debug!(id, version = row.version, "Updated moderation request");
            return Ok(row);
        }

        // Nothing matched: either the row is gone or its version moved on.
        if let Some(expected) = expected_version {
            if self.exists(id).await? {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    expected,
                });
            }
        }
        Err(StoreError::NotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<ModerationRequest, StoreError> {
        let response = self
            .request(Method::DELETE)
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        let row = Self::parse_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        tracing::debug!(id, "Deleted moderation request");
        Ok(row)
    }
}

/// Decode listed rows one by one so that a single unreadable row does not
/// hide the rest of the table. Unreadable rows are logged and skipped.
fn decode_listed(raw: Vec<serde_json::Value>) -> Vec<ModerationRequest> {
    raw.into_iter()
        .filter_map(|value| {
            let id = value.get("id").map(ToString::to_string).unwrap_or_default();
            match serde_json::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Skipping unreadable moderation request row");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_targets_configured_table() {
        let store = RestStore::new(
            StoreConfig::new("https://demo.supabase.co/", "key").with_table("requests_v2"),
        )
        .unwrap();
        assert_eq!(store.endpoint, "https://demo.supabase.co/rest/v1/requests_v2");
        assert_eq!(store.table(), "requests_v2");
    }

    #[test]
    fn unreadable_listed_row_is_skipped() {
        let rows = decode_listed(vec![
            serde_json::json!({
                "id": "r1",
                "timestamp": "2024-05-01T12:00:00Z",
                "content_type": "text",
                "content": "hi",
                "status": "clean"
            }),
            serde_json::json!({"id": "r2", "content": "no timestamp"}),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "r1");
    }

    #[test]
    fn timeout_is_optional() {
        assert!(RestStore::new(StoreConfig::new("http://localhost", "key")).is_ok());
        assert!(RestStore::new(StoreConfig::new("http://localhost", "key").with_timeout_secs(5)).is_ok());
    }
}
