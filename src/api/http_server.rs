// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use super::embed::embed_handler;
use super::handlers::{health_handler, not_found_handler};
use crate::config::NodeConfig;
use crate::embeddings::EmbedPipeline;

#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<EmbedPipeline>,
}

impl AppState {
    pub fn new(pipeline: EmbedPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Builds the service router
///
/// Routes:
/// - `POST /embed`
/// - `GET /health`
///
/// Anything else answers 404 with a JSON error body. Requests running longer
/// than `request_timeout` are cut off by the transport layer.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .fallback(not_found_handler)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `config.host:config.port` and serves until Ctrl+C or SIGTERM
pub async fn start_server(config: &NodeConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Embedding API listening on {}", addr);

    let app = create_app(state, config.request_timeout());
    serve_with_shutdown(listener, app, shutdown_signal()).await
}

/// Serves `app` on an already-bound listener until `signal` resolves
pub async fn serve_with_shutdown<F>(listener: TcpListener, app: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .context("HTTP server error")?;

    info!("Embedding API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
