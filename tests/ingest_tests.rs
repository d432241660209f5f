use logtally::config::parse_config;
use logtally::pipeline::spawn_workers;
use logtally::transport;
use logtally::{Bucket, SourceRegistry};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::watch;

fn config_for(path: &std::path::Path) -> String {
    format!(
        r#"
sources:
  - name: epoch
    location: '{}'
    delimiters: {{ field: ' ' }}
    timestamp: {{ index: 0, format: epoch }}
    fields:
      - {{ index: 1, name: message }}
    bucket_width: 1m
transport:
  poll_interval: 10ms
  follow: true
"#,
        path.display()
    )
}

/// Wait until the aggregation satisfies `done`, or fail after a timeout.
async fn wait_for(
    rx: &mut watch::Receiver<logtally::Aggregation>,
    done: impl Fn(&[Bucket]) -> bool,
) -> Vec<Bucket> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if done(&current.buckets[..]) {
                    return current.buckets.to_vec();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("aggregation should update")
}

#[tokio::test]
async fn test_file_changes_recompute_aggregation() {
    let mut log_file = NamedTempFile::new().unwrap();
    writeln!(log_file, "0 started").unwrap();
    writeln!(log_file, "20 ready").unwrap();
    log_file.flush().unwrap();

    let config = parse_config(&config_for(log_file.path())).unwrap();
    let registry = Arc::new(SourceRegistry::from_config(&config).unwrap());
    let mut updates = registry.subscribe("epoch").unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let transport_config = config.transport.clone();
    let workers = spawn_workers(
        &registry,
        |source| transport::for_source(source.config(), &transport_config),
        shutdown_rx,
    );

    let initial = wait_for(&mut updates, |b| !b.is_empty()).await;
    assert_eq!(initial, vec![Bucket { x: 0, y: 2 }]);

    writeln!(log_file, "not a timestamp").unwrap();
    writeln!(log_file, "120 tick").unwrap();
    log_file.flush().unwrap();

    let updated = wait_for(&mut updates, |b| b.len() == 2).await;
    assert_eq!(
        updated,
        vec![Bucket { x: 0, y: 2 }, Bucket { x: 120_000, y: 1 }]
    );

    shutdown_tx.send(true).unwrap();
    for worker in workers {
        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("worker should stop")
            .unwrap();
    }
}

#[tokio::test]
async fn test_truncated_file_replaces_aggregation() {
    let mut log_file = NamedTempFile::new().unwrap();
    writeln!(log_file, "0 a").unwrap();
    writeln!(log_file, "600 b").unwrap();
    writeln!(log_file, "1200 c").unwrap();
    log_file.flush().unwrap();

    let config = parse_config(&config_for(log_file.path())).unwrap();
    let registry = Arc::new(SourceRegistry::from_config(&config).unwrap());
    let mut updates = registry.subscribe("epoch").unwrap();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let transport_config = config.transport.clone();
    let _workers = spawn_workers(
        &registry,
        |source| transport::for_source(source.config(), &transport_config),
        shutdown_rx,
    );

    wait_for(&mut updates, |b| b.len() == 3).await;

    std::fs::write(log_file.path(), "3000 only\n").unwrap();

    let replaced = wait_for(&mut updates, |b| b.len() == 1).await;
    assert_eq!(replaced, vec![Bucket { x: 3_000_000, y: 1 }]);
}
