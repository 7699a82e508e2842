//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::SharedItemStore;
use api::config::Config;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use event_store::{CommandEnvelope, InMemoryEventLog};
use item_store::{InMemoryItemStore, ItemStore};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

const ITEM_A: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
const ITEM_B: &str = "6ba7b811-9dad-11d1-80b4-00c04fd430c8";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: Router,
    store: InMemoryItemStore,
    events: InMemoryEventLog,
}

fn setup() -> TestApp {
    let store = InMemoryItemStore::new();
    let events = InMemoryEventLog::new();
    let shared: SharedItemStore = Arc::new(store.clone());
    let state = api::create_state(shared, events.clone(), &Config::default());
    let app = api::create_app(state, get_metrics_handle());
    TestApp { app, store, events }
}

fn item_json(item_id: &str, lot: &str) -> Value {
    json!({
        "itemID": item_id,
        "lot": lot,
        "name": "N",
        "origin": "O",
        "price": 12.3,
        "rsCustomerID": "C1",
        "sku": "S1",
        "upc": "U1",
        "dateArrived": 1000,
        "timestamp": 1000,
        "totalWeight": 4.7
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn command(app: &Router, action: &str, data: Value) -> (StatusCode, Value) {
    let cmd = CommandEnvelope::new(action, data);
    send(
        app,
        "POST",
        "/commands",
        Body::from(serde_json::to_vec(&cmd).unwrap()),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let test = setup();

    let (status, json) = send(&test.app, "GET", "/health", Body::empty()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["events"], 0);
    assert_eq!(json["replay_position"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let test = setup();

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_add_item_generates_id_and_publishes_event() {
    let test = setup();

    let cmd = CommandEnvelope::new("AddItem", item_json("", "L1"));
    let (status, json) = send(
        &test.app,
        "POST",
        "/commands",
        Body::from(serde_json::to_vec(&cmd).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["uuid"], cmd.uuid.to_string());
    assert_eq!(json["correlationId"], cmd.correlation_id.to_string());
    let item_id = json["data"]["itemID"].as_str().unwrap().to_string();
    assert!(!item_id.is_empty());
    assert!(json.get("errorCode").is_none());

    let (status, events) = send(&test.app, "GET", "/events", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "ItemRegistered");
    assert_eq!(events[0]["data"]["itemID"], item_id.as_str());
    assert_eq!(events[0]["correlationId"], cmd.uuid.to_string());
}

#[tokio::test]
async fn test_duplicate_add_after_catch_up_is_rejected() {
    let test = setup();

    let (status, _) = command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;
    assert_eq!(status, StatusCode::OK);

    // The second command catches up first, so the registered item is visible
    let (status, json) = command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "item already exists");
    assert_eq!(json["errorCode"], 2);

    assert_eq!(test.events.event_count().await, 1);
}

#[tokio::test]
async fn test_update_item_flow() {
    let test = setup();

    command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;

    let (status, json) = command(
        &test.app,
        "UpdateItem",
        json!({"filter": {"lot": "L1"}, "update": {"lot": "L2"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["update"]["lot"], "L2");
    assert_eq!(json["data"]["update"]["itemID"], ITEM_A);

    let (status, summary) = send(&test.app, "POST", "/replay", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["applied"], 1);
    assert_eq!(summary["position"], 2);

    let stored = test
        .store
        .find_one(&item_json(ITEM_A, "L2").as_object().cloned().unwrap())
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_delete_without_match_is_user_error() {
    let test = setup();

    let (status, json) = command(&test.app, "DeleteItem", json!({"lot": "L1"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "item not found");
    assert_eq!(test.events.event_count().await, 0);
}

#[tokio::test]
async fn test_delete_item_flow() {
    let test = setup();

    command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;
    command(&test.app, "AddItem", item_json(ITEM_B, "L1")).await;

    let (status, json) = command(&test.app, "DeleteItem", json!({"lot": "L1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["matchedCount"], 2);

    send(&test.app, "POST", "/replay", Body::empty()).await;
    assert!(test.store.is_empty().await);
}

#[tokio::test]
async fn test_unknown_action_is_user_error() {
    let test = setup();

    let (status, json) = command(&test.app, "ShipItem", json!({})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["errorCode"], 2);
    assert_eq!(test.events.event_count().await, 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let test = setup();

    let (status, _) = send(
        &test.app,
        "POST",
        "/commands",
        Body::from("not json at all"),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_replay_reports_summary() {
    let test = setup();

    command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;
    command(&test.app, "AddItem", item_json(ITEM_B, "L2")).await;

    let (status, summary) = send(&test.app, "POST", "/replay", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["position"], 2);
    assert_eq!(summary["failed"], 0);
    assert_eq!(test.store.len().await, 2);

    // Nothing new to apply
    let (_, summary) = send(&test.app, "POST", "/replay", Body::empty()).await;
    assert_eq!(summary["applied"], 0);
    assert_eq!(summary["position"], 2);
}

#[tokio::test]
async fn test_rebuild_replays_full_history() {
    let test = setup();

    command(&test.app, "AddItem", item_json(ITEM_A, "L1")).await;
    command(&test.app, "AddItem", item_json(ITEM_B, "L2")).await;
    send(&test.app, "POST", "/replay", Body::empty()).await;

    test.store.clear().await;

    let (status, summary) = send(&test.app, "POST", "/replay/rebuild", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["applied"], 2);
    assert_eq!(summary["position"], 2);
    assert_eq!(test.store.len().await, 2);
}

#[tokio::test]
async fn test_unavailable_event_log_is_service_unavailable() {
    let test = setup();
    test.events.set_unavailable(true);

    let (status, json) = send(&test.app, "POST", "/replay", Body::empty()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().is_some());
}
