//! Liveness responder: any request gets `200 Online`.

use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::error::{io_err, DaemonError};

pub const LIVENESS_BODY: &str = "Online";

pub fn router() -> Router {
    Router::new().fallback(online)
}

async fn online() -> (StatusCode, &'static str) {
    (StatusCode::OK, LIVENESS_BODY)
}

/// Serve [`router`] on `listener` until shutdown is broadcast.
pub async fn serve(
    listener: TcpListener,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let addr = listener
        .local_addr()
        .map_err(|e| io_err("liveness listener", e))?;
    tracing::info!(%addr, "liveness endpoint listening");
    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .map_err(|e| io_err("liveness server", e))
}
