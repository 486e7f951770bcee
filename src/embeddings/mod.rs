// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding providers and the model lifecycle
//!
//! An [`EmbeddingProvider`] maps text to a fixed-length vector. The
//! [`EmbeddingModelManager`] owns the single process-wide provider
//! instance and tracks whether it is ready to serve.

pub mod errors;
pub mod hash_model;
pub mod model_manager;
pub mod onnx_model;

pub use errors::EmbeddingError;
pub use hash_model::HashEmbeddingModel;
pub use model_manager::{EmbeddingModelManager, ModelGuard, ServiceState, VERIFICATION_TEXTS};
pub use onnx_model::{resolve_artifacts, ModelArtifacts, OnnxEmbeddingModel};

use crate::config::{EmbeddingBackend, ServiceConfig};
use std::sync::Arc;

/// A text embedding model.
///
/// Calls are synchronous and CPU-bound; async callers must run them on a
/// blocking thread. Implementations must tolerate concurrent calls,
/// serializing internally if the backend cannot.
#[cfg_attr(test, mockall::automock)]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds all texts in one call; `result[i]` belongs to `texts[i]`
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Constructs the provider selected by `config.backend`. Blocking.
pub fn build_provider(
    config: &ServiceConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.backend {
        EmbeddingBackend::Onnx => Ok(Arc::new(OnnxEmbeddingModel::from_cache(
            &config.model_id,
            &config.cache_dir,
            config.max_sequence_length,
        )?)),
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbeddingModel::new(config.dimension)?)),
    }
}
