//! Record store behaviour against a mock records backend.

use std::sync::Arc;

use blotter_client::{
    ApiStatus, ClientConfig, EnrichedEvidenceSource, FailurePolicy, HttpClient, HttpSource,
    LoadOutcome, RecordSource, RecordStore, RecordView,
};
use blotter_core::{fallback, Case, CaseField, Criminal, Evidence, Officer, Selection};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = ClientConfig::default()
        .with_base_url(format!("{}/api", server.uri()))
        .with_timeout_secs(5);
    HttpClient::new(config).expect("valid config")
}

fn cases_body() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "c1",
            "crime_type": "ROBBERY",
            "description": "Armed robbery at Central Bank downtown",
            "location": "Central Bank, Downtown",
            "status": "OPEN",
            "date_committed": "2024-01-15",
            "criminal_name": "John Doe",
            "arresting_officer_name": "Det. Johnson"
        },
        {
            "id": "c2",
            "crime_type": "THEFT",
            "description": "Car theft",
            "location": null,
            "status": "CLOSED",
            "date_committed": "not a date"
        }
    ])
}

#[tokio::test]
async fn test_load_cases_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/crimes/"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cases_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Case>> = Arc::new(HttpSource::<Case>::new(client_for(&server)));
    let store = RecordStore::new(source);

    assert_eq!(store.load().await, LoadOutcome::Applied { count: 2 });
    let snap = store.snapshot().await;
    assert_eq!(snap.status, ApiStatus::Connected);
    assert_eq!(snap.records[0].criminal_name.as_deref(), Some("John Doe"));
    // Malformed optional fields become absent instead of failing the load.
    assert!(snap.records[1].date_committed.is_none());
    assert!(snap.records[1].location.is_none());
}

#[tokio::test]
async fn test_paginated_officers_with_integer_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/officers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 1,
            "next": null,
            "results": [{
                "id": 12,
                "user": {"id": 40, "first_name": "Maria", "last_name": "Chen"},
                "badge_number": "P10293",
                "rank": "SERGEANT",
                "station": "Westside",
                "is_active": true
            }]
        })))
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Officer>> =
        Arc::new(HttpSource::<Officer>::new(client_for(&server)));
    let store = RecordStore::new(source);
    store.load().await;

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "12");
    assert_eq!(records[0].display_name(), "Maria Chen");
}

#[tokio::test]
async fn test_http_error_clears_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/criminals/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Criminal>> =
        Arc::new(HttpSource::<Criminal>::new(client_for(&server)));
    let store = RecordStore::new(source);

    let outcome = store.load().await;
    assert_eq!(
        outcome,
        LoadOutcome::Failed {
            error: "Failed to load criminals: HTTP error! status: 500".to_string(),
            fallback_used: false,
        }
    );
    let snap = store.snapshot().await;
    assert!(snap.is_empty());
    assert_eq!(snap.status, ApiStatus::Error);
    assert!(!snap.loading);
}

#[tokio::test]
async fn test_http_error_installs_fallback_cases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/crimes/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Case>> = Arc::new(HttpSource::<Case>::new(client_for(&server)));
    let store = Arc::new(
        RecordStore::new(source).with_failure_policy(FailurePolicy::fallback(fallback::cases())),
    );

    let outcome = store.load().await;
    assert!(matches!(
        outcome,
        LoadOutcome::Failed {
            fallback_used: true,
            ..
        }
    ));
    let snap = store.snapshot().await;
    assert_eq!(snap.status, ApiStatus::Error);
    assert_eq!(snap.len(), 3);
    assert_eq!(
        snap.message.as_deref(),
        Some("Failed to load crimes: HTTP error! status: 503 (maintenance)")
    );

    // Fallback records are filterable like live ones.
    let mut view = RecordView::new(store.clone());
    view.select(CaseField::Status, Selection::value("OPEN"));
    assert_eq!(view.filtered().await.len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let config = ClientConfig::default()
        .with_base_url("http://127.0.0.1:9/api")
        .with_timeout_secs(2);
    let client = HttpClient::new(config).unwrap();
    let source: Arc<dyn RecordSource<Case>> = Arc::new(HttpSource::<Case>::new(client.clone()));
    let store = RecordStore::new(source);

    match store.load().await {
        LoadOutcome::Failed { error, fallback_used } => {
            assert!(error.starts_with("Failed to load crimes: Network error"), "{}", error);
            assert!(!fallback_used);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/crimes/"))
        .and(header("Authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(format!("{}/api", server.uri()))
        .with_auth_token("s3cret");
    let client = HttpClient::new(config).unwrap();

    let records = client.fetch_collection::<Case>().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_evidence_names_resolved_from_criminals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/criminals/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "k1", "first_name": "John", "last_name": "Doe"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/criminal-evidence/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "e1", "criminal": "k1", "evidence_type": "PHOTO", "case_number": "CR-001"},
            {"id": "e2", "criminal": "k9", "evidence_type": "DOCUMENT"}
        ])))
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Evidence>> =
        Arc::new(EnrichedEvidenceSource::from_client(client_for(&server)));
    let store = Arc::new(RecordStore::new(source));
    let mut view = RecordView::new(store);
    view.mount().await;

    let all = view.filtered().await.to_vec();
    assert_eq!(all[0].criminal_name.as_deref(), Some("John Doe"));
    assert_eq!(all[1].criminal_name.as_deref(), Some("Unknown Criminal"));

    // The resolved name is searchable.
    view.set_query("john");
    let shown = view.filtered().await;
    assert_eq!(shown.len(), 1);
    assert_eq!(
        shown.summary().describe("evidence items"),
        "Showing 1 of 2 evidence items (filtered)"
    );
}

#[tokio::test]
async fn test_evidence_loads_when_criminals_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/criminals/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/criminal-evidence/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "e1", "criminal": "k1"}
        ])))
        .mount(&server)
        .await;

    let source: Arc<dyn RecordSource<Evidence>> =
        Arc::new(EnrichedEvidenceSource::from_client(client_for(&server)));
    let store = RecordStore::new(source);

    assert_eq!(store.load().await, LoadOutcome::Applied { count: 1 });
    let records = store.records().await;
    assert_eq!(records[0].criminal_name.as_deref(), Some("Unknown Criminal"));
}
