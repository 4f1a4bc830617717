//! Main HTTP Gateway Server.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use qrscan_config::ServerConfig;
use qrscan_scanner::Scanner;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

use crate::{health_api, scan_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub scanner: Arc<Scanner>,
    pub max_body_bytes: usize,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(scanner: Arc<Scanner>, config: &ServerConfig) -> Self {
        Self {
            scanner,
            max_body_bytes: config.max_body_bytes,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/", get(health_api::get_info))
        .route("/health", get(health_api::get_health))
        .route("/scan/file", get(scan_api::scan_file))
        .route("/scan/upload", post(scan_api::scan_upload))
        .route("/scan/base64", post(scan_api::scan_base64))
        .route("/scan/url", post(scan_api::scan_url))
        .route("/scan/batch", post(scan_api::scan_batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `server.bind_address:server.port` and serves until Ctrl-C.
#[instrument(skip_all)]
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve(listener, state).await
}

/// Serves on an already-bound listener.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<()> {
    let local = listener.local_addr()?;
    let app = build_router(state);

    info!(addr = %local, "Gateway HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
