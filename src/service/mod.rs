// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Service
//!
//! Orchestrates readiness check -> validation -> provider call -> result
//! checks, and is the only place that decides which typed error a request
//! ends with. Readiness is checked before content validation.

pub mod errors;
pub mod validator;

pub use errors::ServiceError;
pub use validator::{validate_batch, validate_batch_size, validate_text, ValidationError};

use crate::embeddings::{
    EmbeddingError, EmbeddingModelManager, EmbeddingProvider, ServiceState,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Snapshot returned by [`EmbeddingService::health`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub ready: bool,
    pub model_id: String,
    pub dimension: usize,
}

#[derive(Debug, Clone)]
pub struct EmbeddingService {
    manager: Arc<EmbeddingModelManager>,
    max_batch_size: usize,
}

impl EmbeddingService {
    pub fn new(manager: Arc<EmbeddingModelManager>, max_batch_size: usize) -> Self {
        Self {
            manager,
            max_batch_size,
        }
    }

    pub fn model_id(&self) -> &str {
        self.manager.model_id()
    }

    pub fn dimension(&self) -> usize {
        self.manager.dimension()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Reports readiness without touching the provider
    pub fn health(&self) -> Result<HealthStatus, ServiceError> {
        match self.manager.state() {
            ServiceState::Ready => {}
            ServiceState::Uninitialized => {
                return Err(ServiceError::Unavailable(
                    "Model not loaded. Service is starting up.".to_string(),
                ))
            }
            ServiceState::Failed => {
                return Err(ServiceError::Unavailable(
                    "Model not loaded. Model failed to load.".to_string(),
                ))
            }
        }

        Ok(HealthStatus {
            ready: true,
            model_id: self.manager.model_id().to_string(),
            dimension: self.manager.dimension(),
        })
    }

    /// Embeds one text; the provider's `encode` is called exactly once.
    pub async fn vectorize(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let provider = self.ready_provider()?;
        let text = validate_text(text)?.to_string();

        debug!("Vectorizing text ({} chars)", text.len());

        let vector = run_blocking("Embedding generation", move || provider.encode(&text)).await?;
        self.check_dimension(&vector)?;

        Ok(vector)
    }

    /// Embeds all texts with a single `encode_batch` call.
    ///
    /// All-or-nothing: any invalid item or provider failure fails the whole
    /// batch. On success `result[i]` is the embedding of `texts[i]`.
    pub async fn vectorize_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        let provider = self.ready_provider()?;
        let texts = validate_batch(texts, self.max_batch_size)?;
        let expected = texts.len();

        debug!("Vectorizing batch of {} texts", expected);

        let vectors =
            run_blocking("Batch embedding generation", move || provider.encode_batch(&texts))
                .await?;

        if vectors.len() != expected {
            let err = EmbeddingError::BatchMismatch {
                expected,
                actual: vectors.len(),
            };
            error!("Batch embedding generation failed: {}", err);
            return Err(ServiceError::Internal(format!(
                "Batch embedding generation failed: {}",
                err
            )));
        }
        for vector in &vectors {
            self.check_dimension(vector)?;
        }

        Ok(vectors)
    }

    fn ready_provider(&self) -> Result<Arc<dyn EmbeddingProvider>, ServiceError> {
        if !self.manager.is_ready() {
            return Err(ServiceError::Unavailable("Model not loaded".to_string()));
        }
        // Unload can race with the readiness check
        self.manager
            .provider()
            .ok_or_else(|| ServiceError::Unavailable("Model not loaded".to_string()))
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), ServiceError> {
        let expected = self.manager.dimension();
        if vector.len() != expected {
            let err = EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            };
            error!("Embedding generation failed: {}", err);
            return Err(ServiceError::Internal(format!(
                "Embedding generation failed: {}",
                err
            )));
        }
        Ok(())
    }
}

/// Runs a CPU-bound provider call on tokio's blocking pool
async fn run_blocking<T, F>(operation: &'static str, task: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!("{} failed: {}", operation, e);
            Err(ServiceError::Internal(format!("{} failed: {}", operation, e)))
        }
        Err(join_err) => {
            error!("{} worker aborted: {}", operation, join_err);
            Err(ServiceError::Internal(format!(
                "{} failed: worker aborted",
                operation
            )))
        }
    }
}
