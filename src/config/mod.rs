// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! The model identifier and output dimension are fixed per deployment:
//! switching models means updating [`EMBEDDING_DIMENSION`] alongside
//! [`DEFAULT_MODEL_ID`]. Only the artifact cache location and the listen
//! address are expected to vary between environments.

use std::path::PathBuf;

/// Multilingual sentence transformer (50+ languages, including Indonesian)
pub const DEFAULT_MODEL_ID: &str = "paraphrase-multilingual-MiniLM-L12-v2";

/// Output dimension of paraphrase-multilingual-MiniLM-L12-v2
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maximum number of texts accepted by one batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Token limit applied by the model's tokenizer (longer inputs are truncated)
pub const MAX_SEQUENCE_LENGTH: usize = 128;

pub const DEFAULT_CACHE_DIR: &str = "/app/models";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Which embedding provider implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EmbeddingBackend {
    /// ONNX Runtime sentence transformer loaded from the cache directory
    #[default]
    Onnx,
    /// Deterministic hash-seeded vectors, for local smoke runs without model files
    Hash,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Model identifier reported by /health and used to locate artifacts
    pub model_id: String,
    /// Directory holding model artifacts
    pub cache_dir: PathBuf,
    /// Expected output dimension D
    pub dimension: usize,
    /// Upper bound on batch cardinality
    pub max_batch_size: usize,
    /// Tokenizer truncation length
    pub max_sequence_length: usize,
    pub listen_addr: String,
    pub backend: EmbeddingBackend,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            dimension: EMBEDDING_DIMENSION,
            max_batch_size: MAX_BATCH_SIZE,
            max_sequence_length: MAX_SEQUENCE_LENGTH,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            backend: EmbeddingBackend::default(),
        }
    }
}
