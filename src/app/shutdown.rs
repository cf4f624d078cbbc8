use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `token` on SIGINT or SIGTERM.
pub fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {
                info!("Initiating graceful shutdown");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}

/// Resolves once a shutdown signal arrives.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match unix_signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                error!("Failed to create SIGTERM handler: {}", err);
                wait_for_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = wait_for_ctrl_c() => {}
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT (Ctrl+C)"),
        Err(err) => {
            error!("Failed to listen for SIGINT: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
