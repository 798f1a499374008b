//! Webhook batch delivery tests
//!
//! The linger-window accumulator is tested directly, and the full delivery
//! loop is driven against a local collector server that records every POST
//! it receives.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use r700_emu::config::WebhookSettings;
use r700_emu::core::Epc;
use r700_emu::sources::ListKind;
use r700_emu::state::ReaderState;
use r700_emu::webhook::{collect_window, WebhookSink};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn test_state() -> (Arc<ReaderState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(ReaderState::new(dir.path()).unwrap());
    (state, dir)
}

fn webhook_settings(value: Value) -> WebhookSettings {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_idle_window_is_abandoned_without_a_batch() {
    let (state, _dir) = test_state();
    let settings = webhook_settings(json!({
        "active": true,
        "eventBatchLingerMilliseconds": 200,
    }));

    // Lifecycle idle, nothing buffered: the window yields no batch.
    let batch = collect_window(&state, &settings).await;
    assert!(batch.is_none());
}

#[tokio::test]
async fn test_running_window_accumulates_events() {
    let (state, _dir) = test_state();
    let entries: Vec<String> = (0..4).map(|_| Epc::random().hex()).collect();
    state.lists().replace(ListKind::Repeating, &entries).unwrap();
    state.start_session().unwrap();

    let settings = webhook_settings(json!({
        "active": true,
        "eventBatchLingerMilliseconds": 300,
    }));

    let batch = collect_window(&state, &settings).await.expect("events expected");
    assert!(!batch.is_empty());
    for event in &batch {
        assert!(entries.contains(&event.tag_inventory_event.epc_hex));
    }
}

#[tokio::test]
async fn test_batch_limit_caps_the_window() {
    let (state, _dir) = test_state();
    let entries: Vec<String> = (0..4).map(|_| Epc::random().hex()).collect();
    state.lists().replace(ListKind::Repeating, &entries).unwrap();
    state.start_session().unwrap();

    let settings = webhook_settings(json!({
        "active": true,
        "eventBatchLimit": 3,
        "eventBatchLingerMilliseconds": 500,
    }));

    let batch = collect_window(&state, &settings).await.expect("events expected");
    assert_eq!(batch.len(), 3);
}

#[tokio::test]
async fn test_stop_mid_window_flushes_buffered_events() {
    let (state, _dir) = test_state();
    let entries: Vec<String> = (0..4).map(|_| Epc::random().hex()).collect();
    state.lists().replace(ListKind::Repeating, &entries).unwrap();
    state.start_session().unwrap();

    let settings = webhook_settings(json!({
        "active": true,
        "eventBatchLingerMilliseconds": 5000,
    }));

    let stopper = {
        let state = Arc::clone(&state);
        async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            state.stop_session();
        }
    };

    let (batch, ()) = tokio::join!(collect_window(&state, &settings), stopper);
    let batch = batch.expect("buffered events flushed on stop");
    assert!(!batch.is_empty());
    // Well short of what a full five-second window would have held
    assert!(batch.len() < 20);
}

#[derive(Clone)]
struct Collector {
    batches: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

async fn record_batch(
    State(collector): State<Collector>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> &'static str {
    if let Some(auth) = headers.get("authorization") {
        collector.auth_headers.lock().unwrap().push(auth.to_str().unwrap().to_string());
    }
    collector.batches.lock().unwrap().push(payload);
    "ok"
}

async fn spawn_collector() -> (String, Collector) {
    let collector = Collector {
        batches: Arc::new(Mutex::new(Vec::new())),
        auth_headers: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/events", post(record_batch))
        .with_state(collector.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/events", addr), collector)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delivery_loop_posts_batches_to_the_collector() {
    let (state, _dir) = test_state();
    let (url, collector) = spawn_collector().await;

    let entries: Vec<String> = (0..3).map(|_| Epc::random().hex()).collect();
    state.lists().replace(ListKind::Repeating, &entries).unwrap();
    state
        .replace_webhook_settings(webhook_settings(json!({
            "active": true,
            "eventBatchLingerMilliseconds": 200,
            "serverConfiguration": {
                "url": url,
                "authentication": {"username": "collector", "password": "secret"},
            },
        })))
        .unwrap();

    tokio::spawn(WebhookSink::new(Arc::clone(&state)).run());
    state.start_session().unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    state.stop_session();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let batches = collector.batches.lock().unwrap().clone();
    assert!(!batches.is_empty());
    for batch in &batches {
        let events = batch.as_array().expect("batches are JSON arrays");
        assert!(!events.is_empty());
        for event in events {
            assert_eq!(event["eventType"], "tagInventory");
            assert!(entries
                .contains(&event["tagInventoryEvent"]["epcHex"].as_str().unwrap().to_string()));
        }
    }

    // Basic auth was attached and the delivery outcome recorded
    let auth_headers = collector.auth_headers.lock().unwrap().clone();
    assert!(auth_headers.iter().all(|h| h.starts_with("Basic ")));
    let status = state.delivery_status();
    assert_eq!(status.last_status_code, 200);
    assert!(status.last_delivery_timestamp.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_idle_loop_sends_nothing() {
    let (state, _dir) = test_state();
    let (url, collector) = spawn_collector().await;

    state
        .replace_webhook_settings(webhook_settings(json!({
            "active": true,
            "eventBatchLingerMilliseconds": 100,
            "serverConfiguration": {"url": url},
        })))
        .unwrap();

    tokio::spawn(WebhookSink::new(Arc::clone(&state)).run());
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(collector.batches.lock().unwrap().is_empty());
    assert_eq!(state.delivery_status().last_status_code, 0);
}
