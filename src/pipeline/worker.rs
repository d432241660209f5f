use crate::registry::{RegistryError, Source, SourceRegistry};
use crate::source::RawBlob;
use crate::transport::TransportError;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Run ingestion for one source until its blob stream ends or shutdown is signalled.
///
/// Arrivals are parked in a single-slot watch channel, so a blob that lands
/// while a run is in progress replaces any blob still waiting. Runs for one
/// source never overlap.
pub async fn run_source_worker(
    source: Arc<Source>,
    blobs: BoxStream<'static, Result<RawBlob, TransportError>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let name = source.name().to_string();
    let (latest_tx, mut latest_rx) = watch::channel::<Option<RawBlob>>(None);

    let feeder = tokio::spawn(feed_latest(name.clone(), blobs, latest_tx));

    info!(source = %name, "Source worker started");

    loop {
        tokio::select! {
            changed = latest_rx.changed() => {
                if changed.is_err() {
                    // Feeder finished and the last blob was already processed
                    break;
                }

                let blob = latest_rx.borrow_and_update().clone();
                if let Some(blob) = blob {
                    let aggregation = source.ingest(&blob);
                    debug!(
                        source = %name,
                        bytes = blob.len(),
                        generation = aggregation.generation,
                        buckets = aggregation.buckets.len(),
                        "Aggregation replaced"
                    );
                }
            }

            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    info!(source = %name, "Shutdown signal received");
                    break;
                }
            }
        }
    }

    feeder.abort();
    info!(source = %name, "Source worker stopped");
}

async fn feed_latest(
    name: String,
    mut blobs: BoxStream<'static, Result<RawBlob, TransportError>>,
    latest_tx: watch::Sender<Option<RawBlob>>,
) {
    while let Some(item) = blobs.next().await {
        match item {
            // Latest blob wins over any still waiting to be processed
            Ok(blob) => {
                latest_tx.send_replace(Some(blob));
            }
            Err(e) => warn!(source = %name, error = %e, "Transport error"),
        }
    }
    debug!(source = %name, "Blob stream ended");
}

/// Spawn one worker per source.
pub fn spawn_workers(
    registry: &SourceRegistry,
    mut streams: impl FnMut(&Source) -> BoxStream<'static, Result<RawBlob, TransportError>>,
    shutdown_rx: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    registry
        .sources()
        .iter()
        .map(|source| {
            let blobs = streams(source);
            tokio::spawn(run_source_worker(
                Arc::clone(source),
                blobs,
                shutdown_rx.clone(),
            ))
        })
        .collect()
}

/// Spawn the worker for a single named source.
pub fn spawn_worker(
    registry: &SourceRegistry,
    name: &str,
    blobs: BoxStream<'static, Result<RawBlob, TransportError>>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, RegistryError> {
    let source = registry
        .get(name)
        .ok_or_else(|| RegistryError::UnknownSource(name.to_string()))?;

    Ok(tokio::spawn(run_source_worker(
        Arc::clone(source),
        blobs,
        shutdown_rx,
    )))
}
