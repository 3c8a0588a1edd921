//! Graceful shutdown signal shared by the HTTP binaries

use std::time::Duration;
use tracing::{error, info};

/// Resolve once Ctrl+C or SIGTERM is received, then wait up to `grace`
/// (capped at five seconds) for in-flight requests to drain.
pub async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }

    let grace = grace.min(Duration::from_secs(5));
    info!(grace_secs = grace.as_secs(), "Waiting for connections to close");
    tokio::time::sleep(grace).await;
}
