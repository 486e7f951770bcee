// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Model Manager
//!
//! Owns the single embedding provider for the process lifetime and exposes
//! its readiness. The provider is either fully loaded and verified, or
//! absent: callers never observe a half-initialized model.
//!
//! Lifecycle:
//! ```text
//! Uninitialized --load ok--> Ready --unload--> Uninitialized
//!       |
//!       +--load err--> Failed (fatal at startup)
//! ```

use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{error, info, warn};

/// Sentences encoded right after loading to confirm the output dimension
pub const VERIFICATION_TEXTS: &[&str] = &[
    "Test sentence for model verification",
    "Kos nyaman dekat kampus dengan WiFi dan AC",
    "Rumah kost murah di Jakarta Selatan",
];

/// Process-wide readiness of the embedding capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServiceState {
    Uninitialized = 0,
    Ready = 1,
    Failed = 2,
}

impl ServiceState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ServiceState::Ready,
            2 => ServiceState::Failed,
            _ => ServiceState::Uninitialized,
        }
    }
}

/// Manager for the embedding model lifecycle
///
/// # Example
/// ```ignore
/// let manager = Arc::new(EmbeddingModelManager::new("paraphrase-multilingual-MiniLM-L12-v2", 384));
/// manager.load(|| Ok(Arc::new(HashEmbeddingModel::new(384)?) as Arc<dyn EmbeddingProvider>))?;
/// assert!(manager.is_ready());
/// let _guard = ModelGuard::new(manager.clone()); // unloads on drop
/// ```
pub struct EmbeddingModelManager {
    model_id: String,

    /// Dimension every loaded provider must produce
    dimension: usize,

    /// Mirrors `provider`; readable without taking a lock
    state: AtomicU8,

    provider: RwLock<Option<Arc<dyn EmbeddingProvider>>>,

    /// Serializes `load` against `load` and `unload`
    load_lock: Mutex<()>,
}

impl std::fmt::Debug for EmbeddingModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModelManager")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl EmbeddingModelManager {
    pub fn new(model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimension,
            state: AtomicU8::new(ServiceState::Uninitialized as u8),
            provider: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// O(1), lock-free
    pub fn is_ready(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    /// Builds the provider with `loader`, verifies it, and makes it available.
    ///
    /// Blocking. Meant to run once at startup before traffic is accepted;
    /// calling it again while ready returns the existing provider.
    ///
    /// # Errors
    /// Any loader error, or a provider whose output length differs from the
    /// configured dimension. The state becomes [`ServiceState::Failed`] and
    /// no provider is retained.
    pub fn load<F>(&self, loader: F) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError>
    where
        F: FnOnce() -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError>,
    {
        let _load_guard = self
            .load_lock
            .lock()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))?;

        if let Some(existing) = self.provider() {
            warn!("Model {} already loaded, ignoring load request", self.model_id);
            return Ok(existing);
        }

        info!("Loading model: {}", self.model_id);

        let provider = match loader().and_then(|provider| self.verify(provider)) {
            Ok(provider) => provider,
            Err(e) => {
                error!("Failed to load model {}: {}", self.model_id, e);
                self.state.store(ServiceState::Failed as u8, Ordering::Release);
                return Err(e);
            }
        };

        *self
            .provider
            .write()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))? = Some(provider.clone());
        self.state.store(ServiceState::Ready as u8, Ordering::Release);

        info!(
            "Model {} loaded successfully ({} dimensions)",
            self.model_id, self.dimension
        );

        Ok(provider)
    }

    fn verify(
        &self,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
        if provider.dimension() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: provider.dimension(),
            });
        }

        for text in VERIFICATION_TEXTS {
            let embedding = provider.encode(text)?;
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(provider)
    }

    /// Handle to the loaded provider, `None` unless ready
    pub fn provider(&self) -> Option<Arc<dyn EmbeddingProvider>> {
        self.provider
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Releases the provider. No-op when nothing is loaded.
    ///
    /// In-flight requests holding a handle finish against it; the model is
    /// freed when the last handle drops. Waits for a running `load` so the
    /// state never ends up Ready without a provider.
    pub fn unload(&self) {
        let _load_guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.state.store(ServiceState::Uninitialized as u8, Ordering::Release);

        let released = self
            .provider
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if released.is_some() {
            info!("Model {} unloaded", self.model_id);
        }
    }
}

/// Unloads the model when dropped, covering every exit path of the owner
#[must_use = "the model is unloaded as soon as the guard is dropped"]
pub struct ModelGuard {
    manager: Arc<EmbeddingModelManager>,
}

impl ModelGuard {
    pub fn new(manager: Arc<EmbeddingModelManager>) -> Self {
        Self { manager }
    }
}

impl Drop for ModelGuard {
    fn drop(&mut self) {
        self.manager.unload();
    }
}
