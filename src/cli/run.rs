use crate::config::parse::load_config;
use crate::pipeline::worker::spawn_workers;
use crate::registry::SourceRegistry;
use crate::transport;
use crate::web::run_server;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("web server error: {0}")]
    WebServer(#[from] std::io::Error),
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(config_path) = config_path else {
        eprintln!("Error: config not found");
        eprintln!("Searched locations:");
        eprintln!("  ~/.config/logtally/config.yml");
        eprintln!("  /etc/logtally/config.yml");
        eprintln!("\nUse --config <path> to specify a config file, or run 'logtally config init' to generate one.");
        std::process::exit(1);
    };

    run_pipeline(&config_path).await.map_err(|e| e.into())
}

async fn run_pipeline(config_path: &Path) -> Result<(), RunError> {
    info!(config_path = %config_path.display(), "Loading configuration");

    let config = load_config(config_path)?;
    let registry = Arc::new(SourceRegistry::from_config(&config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(sources = registry.sources().len(), "Starting source workers");
    let transport_config = config.transport.clone();
    let workers = spawn_workers(
        &registry,
        |source| transport::for_source(source.config(), &transport_config),
        shutdown_rx.clone(),
    );

    info!("Starting web server on {}", config.web.listen);
    let mut web_handle = tokio::spawn(run_server(
        Arc::clone(&registry),
        config.web.clone(),
        shutdown_rx,
    ));

    info!("Press Ctrl+C to shutdown");

    let web_result = tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            None
        }
        result = &mut web_handle => {
            // The server only returns early on failure
            let _ = shutdown_tx.send(true);
            Some(result)
        }
    };

    for worker in workers {
        if let Err(e) = worker.await {
            error!(error = %e, "Source worker join error");
        }
    }

    let web_result = match web_result {
        Some(result) => result,
        None => web_handle.await,
    };
    web_result??;

    info!("Shutdown complete");

    Ok(())
}
