use crate::aggregate::classifier::Bucket;
use crate::aggregate::range::{filter_range, parse_bound};
use crate::registry::{Aggregation, SourceRegistry};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SourceRegistry>,
    /// Open update streams end once this turns true
    pub shutdown: watch::Receiver<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourceSummary {
    pub name: String,
    pub location: String,
    pub bucket_width_ms: i64,
    pub generation: u64,
    pub buckets: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketsResponse {
    pub name: String,
    pub generation: u64,
    pub bucket_width_ms: i64,
    pub data: Vec<Bucket>,
}

/// Payload of one `buckets` event on the update stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketsUpdate {
    pub generation: u64,
    pub data: Vec<Bucket>,
}

impl From<&Aggregation> for BucketsUpdate {
    fn from(aggregation: &Aggregation) -> Self {
        Self {
            generation: aggregation.generation,
            data: aggregation.buckets.to_vec(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub until: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub enum ApiError {
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: message })).into_response()
            }
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/sources", get(list_sources))
        .route("/api/sources/:name/buckets", get(get_buckets))
        .route("/api/sources/:name/stream", get(stream_buckets))
        .with_state(state)
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceSummary>> {
    let summaries = state
        .registry
        .sources()
        .iter()
        .map(|source| {
            let aggregation = source.aggregation();
            SourceSummary {
                name: source.name().to_string(),
                location: source.config().location.clone(),
                bucket_width_ms: source.bucket_width_ms(),
                generation: aggregation.generation,
                buckets: aggregation.buckets.len(),
            }
        })
        .collect();

    Json(summaries)
}

/// Current buckets of one source, optionally limited to `from..=until`.
/// Bounds that do not parse are ignored.
pub async fn get_buckets(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<BucketsResponse>, ApiError> {
    let source = state
        .registry
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("unknown source '{}'", name)))?;

    let aggregation = source.aggregation();
    let from = range.from.as_deref().and_then(parse_bound);
    let until = range.until.as_deref().and_then(parse_bound);

    Ok(Json(BucketsResponse {
        name,
        generation: aggregation.generation,
        bucket_width_ms: source.bucket_width_ms(),
        data: filter_range(&aggregation.buckets, from, until),
    }))
}

/// Server-sent events for one source: the current aggregation right away,
/// then one event per replacement.
pub async fn stream_buckets(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let updates = state
        .registry
        .subscribe(&name)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    let events = stream::unfold((updates, true), |(mut updates, first)| async move {
        if !first {
            updates.changed().await.ok()?;
        }

        let update = BucketsUpdate::from(&*updates.borrow_and_update());
        let event = Event::default().event("buckets").json_data(&update);
        Some((event, (updates, false)))
    });

    let mut shutdown = state.shutdown.clone();
    let stopped = async move {
        let closed = shutdown.wait_for(|&stop| stop).await.is_err();
        if closed {
            // No shutdown will ever be signalled
            std::future::pending::<()>().await;
        }
    };

    Ok(Sse::new(events.take_until(stopped)).keep_alive(KeepAlive::default()))
}
