// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::health_handler;
use super::vectorize::{vectorize_batch_handler, vectorize_handler};
use crate::service::EmbeddingService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EmbeddingService>,
}

impl AppState {
    pub fn new(service: EmbeddingService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/vectorize", post(vectorize_handler))
        .route("/vectorize/batch", post(vectorize_batch_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves, then drains in-flight requests
pub async fn start_server<F>(
    state: AppState,
    listen_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");

    Ok(())
}
