// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use kosera_ai_service::{
    build_provider,
    config::{
        DEFAULT_CACHE_DIR, DEFAULT_LISTEN_ADDR, DEFAULT_MODEL_ID, EMBEDDING_DIMENSION,
        MAX_BATCH_SIZE, MAX_SEQUENCE_LENGTH,
    },
    start_server, AppState, EmbeddingBackend, EmbeddingModelManager, EmbeddingService,
    ModelGuard, ServiceConfig,
};
use std::{env, path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Kosera AI Service: text embeddings for semantic search
#[derive(Parser, Debug)]
#[command(name = "kosera-ai-service")]
#[command(version)]
#[command(about = "Text embedding service (single and batch vectorization)", long_about = None)]
struct Args {
    /// Sentence transformer to serve
    #[arg(long, env = "MODEL_NAME", default_value = DEFAULT_MODEL_ID)]
    model: String,

    /// Directory holding the model artifacts
    #[arg(long, env = "TRANSFORMERS_CACHE", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Output dimension the model must produce
    #[arg(long, env = "EMBEDDING_DIMENSION", default_value_t = EMBEDDING_DIMENSION)]
    dimension: usize,

    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    listen_addr: String,

    #[arg(long, env = "EMBEDDING_BACKEND", value_enum, default_value_t = EmbeddingBackend::Onnx)]
    backend: EmbeddingBackend,
}

impl From<Args> for ServiceConfig {
    fn from(args: Args) -> Self {
        ServiceConfig {
            model_id: args.model,
            cache_dir: args.cache_dir,
            dimension: args.dimension,
            max_batch_size: MAX_BATCH_SIZE,
            max_sequence_length: MAX_SEQUENCE_LENGTH,
            listen_addr: args.listen_addr,
            backend: args.backend,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from(Args::parse());

    info!("{}", "=".repeat(50));
    info!("{} starting...", kosera_ai_service::version::get_version_string());
    info!("Build: {}", kosera_ai_service::version::VERSION);
    info!("Loading model: {} ({:?} backend)", config.model_id, config.backend);
    info!("Cache directory: {}", config.cache_dir.display());
    info!("Embedding dimension: {}", config.dimension);

    let manager = Arc::new(EmbeddingModelManager::new(
        config.model_id.clone(),
        config.dimension,
    ));
    // Unloads on every exit path below, including errors
    let _model_guard = ModelGuard::new(manager.clone());

    // Fail fast: a process without a model must exit so the supervisor restarts it
    let load_manager = manager.clone();
    let load_config = config.clone();
    tokio::task::spawn_blocking(move || load_manager.load(|| build_provider(&load_config)))
        .await
        .context("model loading task aborted")?
        .context("CRITICAL ERROR: Failed to load model")?;

    info!("Model loaded successfully!");
    info!("{}", "=".repeat(50));

    let service = EmbeddingService::new(manager, config.max_batch_size);

    start_server(
        AppState::new(service),
        &config.listen_addr,
        shutdown_signal(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("API server failed: {}", e))?;

    info!("Kosera AI Service shutting down...");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
