// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running
//! sentence transformer models exported to ONNX
//! (paraphrase-multilingual-MiniLM-L12-v2 in the reference deployment).
//!
//! Features:
//! - Artifact lookup in the cache directory (flat or HuggingFace hub layout)
//! - Tokenization with truncation to the model's max sequence length
//! - Single and batch embedding generation
//! - Attention-mask weighted mean pooling over token embeddings

use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Organisation the sentence-transformers checkpoints are published under
const HUB_ORGANISATION: &str = "sentence-transformers";

/// Paths of the files needed to build an [`OnnxEmbeddingModel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Locates model.onnx and tokenizer.json for `model_id` under `cache_dir`.
///
/// Two layouts are searched, in order:
/// 1. `<cache_dir>/<model_id>/{model.onnx | onnx/model.onnx, tokenizer.json}`
/// 2. the HuggingFace hub cache (`models--sentence-transformers--<model_id>`)
///
/// Nothing is downloaded; a missing artifact is an error.
pub fn resolve_artifacts(
    cache_dir: &Path,
    model_id: &str,
) -> Result<ModelArtifacts, EmbeddingError> {
    let flat_dir = cache_dir.join(model_id);
    let flat_model = ["model.onnx", "onnx/model.onnx"]
        .iter()
        .map(|name| flat_dir.join(name))
        .find(|path| path.is_file());
    let flat_tokenizer = flat_dir.join("tokenizer.json");

    if let Some(model_path) = flat_model {
        if flat_tokenizer.is_file() {
            return Ok(ModelArtifacts {
                model_path,
                tokenizer_path: flat_tokenizer,
            });
        }
    }

    let repo_id = if model_id.contains('/') {
        model_id.to_string()
    } else {
        format!("{}/{}", HUB_ORGANISATION, model_id)
    };
    let repo = hf_hub::Cache::new(cache_dir.to_path_buf()).model(repo_id.clone());

    let model_path = repo
        .get("onnx/model.onnx")
        .or_else(|| repo.get("model.onnx"))
        .ok_or_else(|| {
            EmbeddingError::ArtifactNotFound(format!(
                "model.onnx for {} under {}",
                repo_id,
                cache_dir.display()
            ))
        })?;
    let tokenizer_path = repo.get("tokenizer.json").ok_or_else(|| {
        EmbeddingError::ArtifactNotFound(format!(
            "tokenizer.json for {} under {}",
            repo_id,
            cache_dir.display()
        ))
    })?;

    Ok(ModelArtifacts {
        model_path,
        tokenizer_path,
    })
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex and concurrent encode calls are serialized.
pub struct OnnxEmbeddingModel {
    session: Mutex<Session>,

    tokenizer: Tokenizer,

    /// Model name (e.g., "paraphrase-multilingual-MiniLM-L12-v2")
    model_name: String,

    /// Hidden size reported by the model's output tensor
    dimension: usize,

    /// Whether the graph declares a `token_type_ids` input (BERT does, XLM-R does not)
    uses_token_type_ids: bool,

    /// Id written into padded positions of a batch
    pad_id: i64,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("uses_token_type_ids", &self.uses_token_type_ids)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// Blocking: builds the ONNX Runtime session and runs one probe inference
    /// to discover the output dimension.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - The probe inference fails or yields an unexpected output shape
    pub fn new(
        model_name: impl Into<String>,
        artifacts: &ModelArtifacts,
        max_length: usize,
    ) -> Result<Self, EmbeddingError> {
        let model_name = model_name.into();
        let load_err = |reason: String| EmbeddingError::ModelLoadFailed {
            model: model_name.clone(),
            reason,
        };

        if !artifacts.model_path.is_file() {
            return Err(EmbeddingError::ArtifactNotFound(
                artifacts.model_path.display().to_string(),
            ));
        }
        if !artifacts.tokenizer_path.is_file() {
            return Err(EmbeddingError::ArtifactNotFound(
                artifacts.tokenizer_path.display().to_string(),
            ));
        }

        info!(
            "Initializing ONNX embedding model from {}",
            artifacts.model_path.display()
        );

        let session = Session::builder()
            .and_then(|builder| {
                builder.with_execution_providers([CPUExecutionProvider::default().build()])
            })
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.with_intra_threads(4))
            .and_then(|mut builder| builder.commit_from_file(&artifacts.model_path))
            .map_err(|e| load_err(format!("ONNX session: {}", e)))?;

        let uses_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&artifacts.tokenizer_path)
            .map_err(|e| load_err(format!("tokenizer: {}", e)))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| load_err(format!("tokenizer truncation: {}", e)))?;

        let pad_id = tokenizer
            .token_to_id("<pad>")
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0) as i64;

        let mut model = Self {
            session: Mutex::new(session),
            tokenizer,
            model_name: model_name.clone(),
            dimension: 0,
            uses_token_type_ids,
            pad_id,
        };

        let probe = model.embed_many(&["dimension probe"])?;
        model.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if model.dimension == 0 {
            return Err(EmbeddingError::ModelLoadFailed {
                model: model.model_name,
                reason: "probe inference produced an empty vector".to_string(),
            });
        }

        info!(
            "ONNX embedding model {} loaded ({} dimensions, token_type_ids: {})",
            model.model_name, model.dimension, model.uses_token_type_ids
        );

        Ok(model)
    }

    /// Resolves artifacts under `cache_dir` and loads the model
    pub fn from_cache(
        model_name: &str,
        cache_dir: &Path,
        max_length: usize,
    ) -> Result<Self, EmbeddingError> {
        let artifacts = resolve_artifacts(cache_dir, model_name)?;
        debug!("Resolved model artifacts: {:?}", artifacts);
        Self::new(model_name, &artifacts, max_length)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Tokenizes, pads to the longest sequence, runs one inference and mean-pools.
    fn embed_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_ref(), true)
                    .map_err(|e| EmbeddingError::TokenizationFailed(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let batch = texts.len();
        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(batch * max_len);
        let mut attention_mask = Vec::with_capacity(batch * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let padding_needed = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            input_ids.extend(std::iter::repeat(self.pad_id).take(padding_needed));

            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let to_array = |values: Vec<i64>| {
            Array2::from_shape_vec((batch, max_len), values)
                .map_err(|e| EmbeddingError::InferenceFailed(format!("tensor shape: {}", e)))
        };
        let mask_array = to_array(attention_mask)?;

        let mut inputs: Vec<(Cow<'static, str>, SessionInputValue<'static>)> = vec![
            ("input_ids".into(), Value::from_array(to_array(input_ids)?)?.into()),
            (
                "attention_mask".into(),
                Value::from_array(mask_array.clone())?.into(),
            ),
        ];
        if self.uses_token_type_ids {
            inputs.push((
                "token_type_ids".into(),
                Value::from_array(Array2::<i64>::zeros((batch, max_len)))?.into(),
            ));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))?;
        let outputs = session.run(inputs)?;

        // Index [0] since different exports name the output differently
        let output = outputs[0].try_extract_array::<f32>()?;

        pool_outputs(&output, &mask_array)
    }
}

/// Turns the model output into one vector per batch item.
///
/// Token-level outputs `[batch, seq_len, hidden]` are mean-pooled with the
/// attention mask so padding does not contribute; sentence-level outputs
/// `[batch, hidden]` are returned as-is.
fn pool_outputs(
    output: &ArrayViewD<'_, f32>,
    attention_mask: &Array2<i64>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let shape = output.shape().to_vec();
    let batch = attention_mask.nrows();

    match shape.as_slice() {
        [b, _] if *b == batch => Ok(output
            .axis_iter(Axis(0))
            .map(|row| row.iter().copied().collect())
            .collect()),
        [b, seq_len, hidden] if *b == batch && *seq_len <= attention_mask.ncols() => {
            let mut embeddings = Vec::with_capacity(batch);

            for batch_idx in 0..batch {
                let item = output.index_axis(Axis(0), batch_idx);
                let mut pooled = vec![0.0f32; *hidden];
                let mut sum_mask = 0.0f32;

                for i in 0..*seq_len {
                    let mask_value = attention_mask[[batch_idx, i]] as f32;
                    sum_mask += mask_value;
                    for (j, value) in pooled.iter_mut().enumerate() {
                        *value += item[[i, j]] * mask_value;
                    }
                }

                for value in &mut pooled {
                    *value /= sum_mask.max(1e-9);
                }

                embeddings.push(pooled);
            }

            Ok(embeddings)
        }
        _ => Err(EmbeddingError::InferenceFailed(format!(
            "unexpected output shape {:?} for batch of {}",
            shape, batch
        ))),
    }
}

impl EmbeddingProvider for OnnxEmbeddingModel {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_many(&[text])?
            .pop()
            .ok_or(EmbeddingError::BatchMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.embed_many(texts)
    }
}
