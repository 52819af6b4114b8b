//! Handler tests over an in-memory record store.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use lendmap_lib::{Book, MemoryStore, ReadingRecord, ReadingStatus, RecordStore};
use lendmap_service_discovery::{app, AppState};

fn book(isbn: &str, title: &str) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: "Marin Preda".to_string(),
        publisher: "Cartea Romaneasca".to_string(),
        published_year: "1955".to_string(),
        cover_url: None,
        description: None,
    }
}

fn reading(owner: &str, isbn: &str, status: ReadingStatus, lat: &str, lon: &str) -> ReadingRecord {
    ReadingRecord {
        owner: owner.to_string(),
        isbn: isbn.to_string(),
        status,
        latitude: lat.to_string(),
        longitude: lon.to_string(),
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.register_book(&book("100", "Morometii")).unwrap();
    store.register_book(&book("200", "Delirul")).unwrap();
    store
        .upsert_reading(&reading(
            "ana@example.com",
            "100",
            ReadingStatus::ToLend,
            "45.0300",
            "25.0000",
        ))
        .unwrap();
    store
        .upsert_reading(&reading(
            "bob@example.com",
            "200",
            ReadingStatus::Lent,
            "45.0010",
            "25.0000",
        ))
        .unwrap();
    Arc::new(store)
}

fn server(store: Arc<MemoryStore>) -> TestServer {
    TestServer::new(app(AppState::from_store(store))).unwrap()
}

#[tokio::test]
async fn test_nearby_returns_lendable_books_in_range() {
    let server = server(seeded_store());

    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "me@example.com",
            "latitude": 45.0,
            "longitude": 25.0,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["requester"], "me@example.com");
    assert_eq!(body["count"], 1);
    assert_eq!(body["nearby"][0]["title"], "Morometii");
    assert_eq!(body["nearby"][0]["owner"], "ana@example.com");
    assert_eq!(body["nearby"][0]["status"], "toLend");
    // The lent record never surfaces even though it is closer.
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn test_nearby_excludes_requesters_own_records() {
    let server = server(seeded_store());

    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "ana@example.com",
            "latitude": 45.0,
            "longitude": 25.0,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_nearby_custom_radius_excludes_distant_books() {
    let server = server(seeded_store());

    // ~3.34 km to ana's book; a 1 km radius misses it.
    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "me@example.com",
            "latitude": 45.0,
            "longitude": 25.0,
            "radius_km": 1.0,
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_nearby_rejects_bad_latitude() {
    let server = server(seeded_store());

    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "me@example.com",
            "latitude": 91.0,
            "longitude": 25.0,
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-request");
    assert!(body["detail"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_nearby_rejects_oversized_radius() {
    let server = server(seeded_store());

    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "me@example.com",
            "latitude": 45.0,
            "longitude": 25.0,
            "radius_km": 500.0,
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nearby_store_failure_is_503_not_empty() {
    let store = seeded_store();
    let server = server(store.clone());
    store.set_unavailable(true);

    let response = server
        .post("/api/v1/discovery/nearby")
        .json(&json!({
            "requester": "me@example.com",
            "latitude": 45.0,
            "longitude": 25.0,
        }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/service-unavailable");
}

#[tokio::test]
async fn test_health_live() {
    let server = server(seeded_store());

    let response = server.get("/health/live").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_ready_reflects_store_state() {
    let store = seeded_store();
    let server = server(store.clone());

    server.get("/health/ready").await.assert_status_ok();

    store.set_unavailable(true);
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
