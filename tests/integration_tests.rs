// Integration tests: HTTP endpoints, auth, and the SSE stream

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use hostpulse::aggregator::Aggregator;
use hostpulse::client::{ConnectionState, EventStreamClient, Freshness, StreamConsumer, TransportEvent};
use hostpulse::config::AppConfig;
use hostpulse::routes;
use hostpulse::models::Snapshot;
use hostpulse::worker::LatestSnapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, mpsc};

struct TestApp {
    app: axum::Router,
    tx: broadcast::Sender<Arc<Snapshot>>,
    latest: LatestSnapshot,
    sse_connections: Arc<AtomicUsize>,
}

fn test_app_with(aggregator: Aggregator, token: Option<&str>) -> TestApp {
    let mut config = AppConfig::load_from_str("").unwrap();
    config.auth.token = token.map(str::to_string);
    let (tx, _) = broadcast::channel(config.monitoring.broadcast_capacity);
    let latest: LatestSnapshot = Arc::new(RwLock::new(None));
    let sse_connections = Arc::new(AtomicUsize::new(0));
    let app = routes::app(
        aggregator,
        tx.clone(),
        latest.clone(),
        sse_connections.clone(),
        &config,
    );
    TestApp {
        app,
        tx,
        latest,
        sse_connections,
    }
}

fn test_app(token: Option<&str>) -> TestApp {
    test_app_with(common::mock_aggregator(), token)
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::new(test_app(None).app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("Hello from hostpulse!");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::new(test_app(None).app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("hostpulse"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_health_reports_mock_mode() {
    let server = TestServer::new(test_app(None).app);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "ok": true, "mockMode": true }));
}

#[tokio::test]
async fn test_stats_envelope() {
    let server = TestServer::new(test_app(None).app);
    let response = server.get("/stats").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["mockMode"], true);
    assert!(json.get("error").is_none());
    assert!(json["data"]["timestamp"].is_string());
    assert_eq!(json["data"]["host"]["system"]["hostname"], "mock-host");
    assert_eq!(json["data"]["containers"]["summary"]["total"], 4);
    assert_eq!(json["data"]["services"]["allHealthy"], true);
}

#[tokio::test]
async fn test_sub_resources_share_the_envelope() {
    let server = TestServer::new(test_app(None).app);

    let host: serde_json::Value = server.get("/host").await.json();
    assert!(host["data"]["cpu"]["usagePercent"].is_number());
    assert_eq!(host["mockMode"], true);

    let containers: serde_json::Value = server.get("/containers").await.json();
    assert_eq!(containers["data"]["containers"].as_array().unwrap().len(), 4);

    let services: serde_json::Value = server.get("/services").await.json();
    assert_eq!(services["data"]["services"][0]["name"], "web");
}

#[tokio::test]
async fn test_stats_degrades_an_overrunning_sampler() {
    let aggregator = Aggregator::new(
        Arc::new(common::SlowSource::containers_only(Duration::from_secs(5))),
        Duration::from_millis(50),
    );
    let server = TestServer::new(test_app_with(aggregator, None).app);

    let response = server.get("/stats").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["data"]["host"]["system"]["hostname"], "mock-host");
    assert_eq!(json["data"]["containers"]["summary"]["total"], 0);
    assert_eq!(json["data"]["services"]["services"].as_array().unwrap().len(), 3);

    let containers: serde_json::Value = server.get("/containers").await.json();
    assert_eq!(containers["data"]["containers"], serde_json::json!([]));
    assert_eq!(containers["mockMode"], true);
}

#[tokio::test]
async fn test_auth_rejects_missing_and_wrong_tokens() {
    let server = TestServer::new(test_app(Some("s3cret")).app);

    let missing = server.get("/health").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    missing.assert_json(&serde_json::json!({ "error": "Missing authentication token" }));

    let wrong = server
        .get("/stats")
        .add_header("X-Profiler-Token", "nope")
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    wrong.assert_json(&serde_json::json!({ "error": "Invalid authentication token" }));

    let ok = server
        .get("/health")
        .add_header("X-Profiler-Token", "s3cret")
        .await;
    ok.assert_status_ok();
}

#[tokio::test]
async fn test_no_token_configured_is_open() {
    let server = TestServer::new(test_app(None).app);
    server
        .get("/stats")
        .add_header("X-Profiler-Token", "anything")
        .await
        .assert_status_ok();
}

// --- SSE: real listener, since the stream never completes ---

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

async fn next_event(rx: &mut mpsc::Receiver<TransportEvent>) -> TransportEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("transport ended")
}

#[tokio::test]
async fn test_sse_headers() {
    let base = serve(test_app(None).app).await;
    let response = reqwest::get(format!("{}/stats/stream", base)).await.unwrap();
    assert!(response.status().is_success());
    let headers = response.headers();
    assert!(
        headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["x-accel-buffering"], "no");
}

#[tokio::test]
async fn test_sse_replays_latest_then_streams_ticks() {
    let t = test_app(Some("s3cret"));
    let first = common::snapshot_at(Utc::now(), 1_000, 100);
    *t.latest.write().await = Some(Arc::new(first.clone()));
    let base = serve(t.app).await;

    let client = EventStreamClient::new(format!("{}/stats/stream", base), Some("s3cret".into())).unwrap();
    let (mut rx, handle) = client.spawn(8);
    let mut consumer = StreamConsumer::default();

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connecting);
    assert_eq!(next_event(&mut rx).await, TransportEvent::Opened);
    assert_eq!(t.sse_connections.load(Ordering::Relaxed), 1);
    consumer.handle(&TransportEvent::Opened, Utc::now());

    let replay = next_event(&mut rx).await;
    consumer.handle(&replay, Utc::now());
    assert_eq!(consumer.last_good(), Some(&first));
    assert_eq!(consumer.state(Utc::now()), ConnectionState::Receiving);

    let second = common::snapshot_at(Utc::now(), 2_000, 200);
    t.tx.send(Arc::new(second.clone())).unwrap();
    let tick = next_event(&mut rx).await;
    consumer.handle(&tick, Utc::now());
    assert_eq!(consumer.current(), Some(&second));
    assert_eq!(consumer.history().len(), 2);
    assert_eq!(consumer.freshness(Utc::now()), Freshness::Hot);

    drop(rx);
    handle.abort();
}

#[tokio::test]
async fn test_sse_disconnect_releases_subscription() {
    let t = test_app(None);
    let base = serve(t.app).await;
    let (mut rx, handle) = EventStreamClient::new(format!("{}/stats/stream", base), None)
        .unwrap()
        .spawn(8);

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connecting);
    assert_eq!(next_event(&mut rx).await, TransportEvent::Opened);
    assert_eq!(t.sse_connections.load(Ordering::Relaxed), 1);
    assert_eq!(t.tx.receiver_count(), 1);

    drop(rx);
    handle.abort();

    // The server notices the closed socket on its next write, so keep publishing until it does.
    let snapshot = Arc::new(common::snapshot_at(Utc::now(), 1_000, 100));
    tokio::time::timeout(Duration::from_secs(5), async {
        while t.sse_connections.load(Ordering::Relaxed) != 0 || t.tx.receiver_count() != 0 {
            let _ = t.tx.send(snapshot.clone());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("subscriber count returns to zero after the client goes away");
}

#[tokio::test]
async fn test_sse_client_reports_auth_failure_and_retries() {
    let base = serve(test_app(Some("s3cret")).app).await;
    let client = EventStreamClient::new(format!("{}/stats/stream", base), None)
        .unwrap()
        .with_retry(Duration::from_millis(50));
    let (mut rx, handle) = client.spawn(8);

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connecting);
    match next_event(&mut rx).await {
        TransportEvent::Error(e) => assert!(e.contains("401")),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connecting);

    drop(rx);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("transport should stop once the receiver is dropped")
        .unwrap();
}
