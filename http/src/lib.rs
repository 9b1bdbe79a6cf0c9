pub mod models;
pub mod openapi;
mod routes;
pub mod utils;
mod views {
    pub mod contract;
    pub mod dashboard;
    pub mod layout;
    pub mod not_found;
    pub mod trade;
}

use axum::http::StatusCode;
use kod_core::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Explorer router with the same layers `serve` installs, minus the listener
pub fn app(ctx: Arc<Context>) -> axum::Router {
    let request_timeout = ctx.config().rpc_timeout + Duration::from_secs(5);
    routes::app(ctx)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(socket: TcpListener, ctx: Arc<Context>) -> anyhow::Result<()> {
    let app = app(ctx);

    info!(
        "http server listening on {}",
        socket.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| "unknown".into())
    );

    if let Err(e) = axum::serve(socket, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("http server error: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
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

    info!("shutdown signal received");
}
