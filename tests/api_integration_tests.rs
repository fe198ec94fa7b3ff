//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each admin endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tiercache::{
    api::create_router, cache::ManualClock, AppState, CacheConfig, CacheManager,
    MemoryDurableStore,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_state() -> AppState {
    AppState::new(CacheManager::new(CacheConfig::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_router(create_state());

    let (status, json) = send(&app, "PUT", "/cache/test_key", Some(json!({"value": "test_value"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["ttl"], 300);
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let app = create_router(create_state());

    let (status, json) = send(&app, "PUT", "/cache/ttl_key", Some(json!({"value": 1, "ttl": 60}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ttl"], 60);
}

#[tokio::test]
async fn test_set_endpoint_zero_ttl_rejected() {
    let app = create_router(create_state());

    let (status, json) = send(&app, "PUT", "/cache/k", Some(json!({"value": 1, "ttl": 0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("TTL"));
}

#[tokio::test]
async fn test_set_endpoint_key_too_long() {
    let app = create_router(create_state());
    let uri = format!("/cache/{}", "k".repeat(300));

    let (status, json) = send(&app, "PUT", &uri, Some(json!({"value": 1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("maximum length"));
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_router(create_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/cache/k")
                .header("content-type", "application/json")
                .body(Body::from("not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum rejects unparseable JSON bodies before the handler runs
    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_router(create_state());
    let product = json!({"sku": "MUG-01", "price_cents": 899, "tags": ["kitchen"]});

    send(&app, "PUT", "/cache/product:1", Some(json!({"value": product}))).await;
    let (status, json) = send(&app, "GET", "/cache/product:1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "product:1");
    assert_eq!(json["value"], product);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_router(create_state());

    let (status, json) = send(&app, "GET", "/cache/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_get_reads_through_durable_store() {
    let store = Arc::new(MemoryDurableStore::new());
    let state = AppState::new(CacheManager::new(CacheConfig::default()).with_durable(store.clone()));
    let app = create_router(state.clone());

    send(&app, "PUT", "/cache/invoice:7", Some(json!({"value": {"total": 42}}))).await;
    state.cache.clear().await;

    let (status, json) = send(&app, "GET", "/cache/invoice:7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["total"], 42);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["durable_hits"], 1);
    assert_eq!(stats["entry_count"], 1);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_router(create_state());

    send(&app, "PUT", "/cache/to_delete", Some(json!({"value": "bye"}))).await;
    let (status, json) = send(&app, "DELETE", "/cache/to_delete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("to_delete"));

    let (status, _) = send(&app, "GET", "/cache/to_delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_absent_key_is_ok() {
    let app = create_router(create_state());

    let (status, _) = send(&app, "DELETE", "/cache/never_set", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == PREFIX Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_prefix_endpoint() {
    let app = create_router(create_state());

    send(&app, "PUT", "/cache/p:1", Some(json!({"value": "x"}))).await;
    send(&app, "PUT", "/cache/p:2", Some(json!({"value": "y"}))).await;
    send(&app, "PUT", "/cache/q:1", Some(json!({"value": "z"}))).await;

    let (status, json) = send(&app, "DELETE", "/prefix/p:", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (status, _) = send(&app, "GET", "/cache/q:1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/cache/p:1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_router(create_state());

    send(&app, "PUT", "/cache/stats_key", Some(json!({"value": "v"}))).await;
    send(&app, "GET", "/cache/stats_key", None).await; // hit
    send(&app, "GET", "/cache/nonexistent", None).await; // miss

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["entry_count"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["policy"], "lru");
    assert_eq!(json["max_entries"], 1000);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(create_state());

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["durable"], false);
    assert!(json["timestamp"].is_string());
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let clock = Arc::new(ManualClock::new(0));
    let state = AppState::new(CacheManager::new(CacheConfig::default()).with_clock(clock.clone()));
    let app = create_router(state);

    send(&app, "PUT", "/cache/short", Some(json!({"value": "soon gone", "ttl": 1}))).await;
    let (status, _) = send(&app, "GET", "/cache/short", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_secs(1));

    let (status, _) = send(&app, "GET", "/cache/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == End-to-end over TCP ==

#[tokio::test]
async fn test_server_over_tcp() {
    let app = create_router(create_state());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = client
        .put(format!("{}/cache/customer:3", base))
        .json(&json!({"value": {"name": "Grace"}, "ttl": 120}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = client
        .get(format!("{}/cache/customer:3", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"]["name"], "Grace");

    server.abort();
}
