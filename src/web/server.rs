use crate::config::WebConfig;
use crate::registry::SourceRegistry;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use super::api::{create_router, AppState};

/// Start the web server and serve until shutdown is signalled
pub async fn run_server(
    registry: Arc<SourceRegistry>,
    web_config: WebConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let state = AppState {
        registry,
        shutdown: shutdown_rx.clone(),
    };
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&web_config.listen).await?;
    tracing::info!("Web server listening on {}", web_config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&v| v).await;
            tracing::info!("Web server shutting down gracefully");
        })
        .await
}
