use axum::Router;
use std::{future::Future, io, time::Duration};
use tokio::{net::TcpListener, signal, sync::oneshot, task::JoinError};
use tracing::{info, warn};

/// Serves `app` until `shutdown` resolves, then drains in-flight requests.
///
/// Draining is bounded by `grace`; requests still running afterwards are abandoned.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = shutdown => {}
    }

    info!(grace_ms = grace.as_millis() as u64, "Shutdown requested, draining connections");
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            info!("Server stopped");
            flatten(result)
        }
        Err(_) => {
            warn!("Grace period elapsed, abandoning in-flight requests");
            server.abort();
            Ok(())
        }
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    result.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
