//! HTTP surface for liveness and Prometheus metrics.
//!
//! Runs on a separate tokio task and serves `/healthz` for liveness probes
//! and `/metrics` for Prometheus scraping.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;

async fn healthz_handler() -> &'static str {
    "ok"
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

fn app() -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler))
}

/// Serve on an already-bound listener. Lets tests bind port 0.
pub async fn serve(listener: TcpListener) {
    if let Err(e) = axum::serve(listener, app()).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}

/// Run the HTTP surface on `0.0.0.0:port`.
///
/// This is a long-running task that should be spawned in the background.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => {
            tracing::info!(addr = %addr, "HTTP surface listening");
            listener
        }
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind HTTP surface");
            return;
        }
    };

    serve(listener).await;
}
