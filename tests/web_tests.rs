use axum::body::Body;
use axum::http::{Request, StatusCode};
use logtally::config::parse_config;
use futures::StreamExt;
use logtally::web::api::{BucketsResponse, BucketsUpdate, SourceSummary};
use logtally::web::{create_router, AppState};
use logtally::{Bucket, SourceRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceExt;

const CONFIG: &str = r#"
sources:
  - name: epoch
    location: epoch.log
    delimiters: { field: ' ' }
    timestamp: { index: 0, format: epoch_ms }
    bucket_width: 100ms
  - name: quiet
    location: https://example.com/quiet.log
    timestamp: { index: 0, format: iso8601 }
"#;

fn state_with_shutdown(shutdown: watch::Receiver<bool>) -> AppState {
    let registry = SourceRegistry::from_config(&parse_config(CONFIG).unwrap()).unwrap();
    registry.ingest("epoch", "0 a\n300 b\n100 c\n320 d").unwrap();
    AppState {
        registry: Arc::new(registry),
        shutdown,
    }
}

fn state() -> AppState {
    // The sender is dropped, so no shutdown is ever signalled
    state_with_shutdown(watch::channel(false).1)
}

/// Read server-sent events from `body` until one complete `buckets` event arrives.
async fn next_update(body: &mut axum::body::BodyDataStream) -> Option<BucketsUpdate> {
    let mut buffer = String::new();
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let event = buffer[..end].to_string();
            buffer.replace_range(..end + 2, "");
            if let Some(data) = event.lines().find_map(|l| l.strip_prefix("data: ")) {
                assert!(event.lines().any(|l| l == "event: buckets"));
                return Some(serde_json::from_str(data).unwrap());
            }
            continue;
        }

        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("event should arrive")?
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

async fn open_stream(state: AppState, uri: &str) -> axum::body::BodyDataStream {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
    response.into_body().into_data_stream()
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(state(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_list_sources() {
    let (status, body) = get(state(), "/api/sources").await;

    assert_eq!(status, StatusCode::OK);
    let sources: Vec<SourceSummary> = serde_json::from_slice(&body).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].name, "epoch");
    assert_eq!(sources[0].bucket_width_ms, 100);
    assert_eq!(sources[0].generation, 1);
    assert_eq!(sources[0].buckets, 3);
    assert_eq!(sources[1].name, "quiet");
    assert_eq!(sources[1].location, "https://example.com/quiet.log");
    assert_eq!(sources[1].bucket_width_ms, 300_000);
    assert_eq!(sources[1].buckets, 0);
}

#[tokio::test]
async fn test_buckets_as_xy_pairs() {
    let (status, body) = get(state(), "/api/sources/epoch/buckets").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["data"],
        serde_json::json!([{"x": 0, "y": 1}, {"x": 300, "y": 2}, {"x": 100, "y": 1}])
    );
    assert_eq!(json["generation"], 1);
}

#[tokio::test]
async fn test_buckets_range_filter() {
    let (status, body) = get(state(), "/api/sources/epoch/buckets?from=100&until=299").await;

    assert_eq!(status, StatusCode::OK);
    let response: BucketsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.data, vec![Bucket { x: 100, y: 1 }]);
}

#[tokio::test]
async fn test_unparseable_bound_is_ignored() {
    let (status, body) = get(state(), "/api/sources/epoch/buckets?from=soon").await;

    assert_eq!(status, StatusCode::OK);
    let response: BucketsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.data.len(), 3);
}

#[tokio::test]
async fn test_unknown_source_is_404() {
    let (status, body) = get(state(), "/api/sources/missing/buckets").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_stream_pushes_each_replacement() {
    let state = state();
    let registry = Arc::clone(&state.registry);
    let mut body = open_stream(state, "/api/sources/epoch/stream").await;

    let current = next_update(&mut body).await.unwrap();
    assert_eq!(current.generation, 1);
    assert_eq!(current.data.len(), 3);

    registry.ingest("epoch", "0 a\n50 b").unwrap();

    let pushed = next_update(&mut body).await.unwrap();
    assert_eq!(pushed.generation, 2);
    assert_eq!(pushed.data, vec![Bucket { x: 0, y: 1 }, Bucket { x: 100, y: 1 }]);
}

#[tokio::test]
async fn test_stream_ends_on_shutdown() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut body = open_stream(state_with_shutdown(shutdown_rx), "/api/sources/epoch/stream").await;

    assert_eq!(next_update(&mut body).await.unwrap().generation, 1);

    shutdown_tx.send(true).unwrap();

    assert!(next_update(&mut body).await.is_none());
}

#[tokio::test]
async fn test_stream_unknown_source_is_404() {
    let (status, _) = get(state(), "/api/sources/missing/stream").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
