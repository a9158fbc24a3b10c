//! Wire-level tests for the PostgREST request store.
//!
//! A `wiremock` server stands in for the hosted table so the exact
//! requests (filters, headers, bodies) can be asserted.

use assert_matches::assert_matches;
use chrono::Utc;
use modguard_core::request::{
    ContentType, Flag, FlagType, Flags, NewModerationRequest, RequestPatch, RequestStatus,
};
use modguard_store::{RequestStore, RestStore, StoreConfig, StoreError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/request_data";

fn row(id: &str, flagged: bool, status: &str, version: i64) -> serde_json::Value {
    json!({
        "id": id,
        "timestamp": "2024-05-01T12:00:00+00:00",
        "content_type": "text",
        "content": "I hate you",
        "flags": {"type": "toxicity", "score": 0.9, "flagged": flagged},
        "status": status,
        "feedback": null,
        "version": version
    })
}

fn store_for(server: &MockServer) -> RestStore {
    RestStore::new(StoreConfig::new(server.uri(), "test-anon-key")).unwrap()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_sends_credentials_and_decodes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "*"))
        .and(header("apikey", "test-anon-key"))
        .and(header("Authorization", "Bearer test-anon-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row("r1", true, "flagged", 1)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let rows = store_for(&server).list().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "r1");
    assert_eq!(rows[0].status, RequestStatus::Flagged);
}

#[tokio::test]
async fn list_keeps_rows_with_unrecognized_flag_type() {
    let server = MockServer::start().await;
    let mut external = row("r2", true, "flagged", 1);
    external["flags"] = json!({"type": "profanity", "score": 0.7, "flagged": true});
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row("r1", true, "flagged", 1), external])),
        )
        .mount(&server)
        .await;

    let rows = store_for(&server).list().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_matches!(rows[1].flags, Some(Flags::External(_)));
    assert_eq!(rows[1].flags.as_ref().unwrap().type_names(), ["profanity"]);
}

#[tokio::test]
async fn list_reads_null_version_as_zero() {
    let server = MockServer::start().await;
    let mut legacy = row("r2", false, "clean", 0);
    legacy["version"] = json!(null);
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row("r1", true, "flagged", 3), legacy])),
        )
        .mount(&server)
        .await;

    let rows = store_for(&server).list().await.unwrap();

    assert_eq!(rows.iter().map(|r| r.version).collect::<Vec<_>>(), [3, 0]);
}

#[tokio::test]
async fn list_skips_unreadable_row_and_keeps_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row("r1", true, "flagged", 1),
            {"id": "broken", "content": "missing columns"},
            row("r3", false, "clean", 1)
        ])))
        .mount(&server)
        .await;

    let rows = store_for(&server).list().await.unwrap();

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["r1", "r3"]);
}

#[tokio::test]
async fn list_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let result = store_for(&server).list().await;

    assert_matches!(result, Err(StoreError::Api { status: 401, body }) if body == "Invalid API key");
}

#[tokio::test]
async fn list_reports_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert_matches!(store_for(&server).list().await, Err(StoreError::Decode(_)));
}

// ---------------------------------------------------------------------------
// insert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_asks_for_representation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({"content": "I hate you", "status": "flagged"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row("new-1", true, "flagged", 1)])))
        .expect(1)
        .mount(&server)
        .await;

    let input = NewModerationRequest {
        timestamp: Utc::now(),
        content_type: ContentType::Text,
        content: "I hate you".to_string(),
        flags: Some(Flags::Single(Flag::new(FlagType::Toxicity, 0.9, true))),
        status: RequestStatus::Flagged,
        feedback: None,
    };
    let stored = store_for(&server).insert(&input).await.unwrap();

    assert_eq!(stored.id, "new-1");
    assert_eq!(stored.version, 1);
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

fn clean_patch() -> RequestPatch {
    RequestPatch {
        flags: Some(Flags::Single(Flag::new(FlagType::Toxicity, 0.9, false))),
        status: Some(RequestStatus::Clean),
        feedback: Some(None),
    }
}

#[tokio::test]
async fn update_filters_on_id_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.r1"))
        .and(query_param("version", "eq.1"))
        .and(body_partial_json(json!({
            "status": "clean",
            "flags": {"flagged": false},
            "feedback": null,
            "version": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r1", false, "clean", 2)])))
        .expect(1)
        .mount(&server)
        .await;

    let updated = store_for(&server)
        .update("r1", &clean_patch(), Some(1))
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::Clean);
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn update_of_stale_version_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r1", true, "flagged", 3)])))
        .mount(&server)
        .await;

    let result = store_for(&server).update("r1", &clean_patch(), Some(1)).await;

    assert_matches!(result, Err(StoreError::Conflict { id, expected: 1 }) if id == "r1");
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = store_for(&server).update("gone", &clean_patch(), Some(1)).await;

    assert_matches!(result, Err(StoreError::NotFound { id }) if id == "gone");
}

#[tokio::test]
async fn update_without_locking_omits_version_filter() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r1", false, "clean", 0)])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = StoreConfig::new(server.uri(), "test-anon-key");
    config.optimistic_locking = false;
    let store = RestStore::new(config).unwrap();
    store.update("r1", &clean_patch(), Some(7)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query().unwrap_or_default().contains("version"));
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("version").is_none());
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_removed_row() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.r1"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r1", true, "flagged", 1)])))
        .expect(1)
        .mount(&server)
        .await;

    let removed = store_for(&server).delete("r1").await.unwrap();
    assert_eq!(removed.id, "r1");
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_matches!(
        store_for(&server).delete("gone").await,
        Err(StoreError::NotFound { .. })
    );
}
