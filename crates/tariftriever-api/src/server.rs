//! HTTP server lifecycle

use crate::{AppState, routes};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bind `address` and serve the API until Ctrl-C
///
/// # Errors
/// Returns an I/O error if the address cannot be bound or the server fails
pub async fn serve(state: AppState, address: &str) -> std::io::Result<()> {
    let app = routes::create_router(state);
    let listener = TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "Tariftriever API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
