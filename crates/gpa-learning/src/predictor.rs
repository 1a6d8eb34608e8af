//! Shareable inference handle.
//!
//! [`Predictor`] wraps a [`FittedPipeline`] in an `Arc`, so clones are cheap
//! and every clone reads the same immutable model. [`Predictor::shared`]
//! keeps one handle per artifact path for the life of the process, so callers
//! that predict repeatedly (a UI handler, a request loop) load the file once.

use crate::error::{GpaLearningError, Result};
use crate::model::FittedPipeline;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

static SHARED: Lazy<RwLock<HashMap<PathBuf, Predictor>>> = Lazy::new(Default::default);

/// Cheaply clonable, thread-safe prediction handle.
#[derive(Debug, Clone)]
pub struct Predictor {
    pipeline: Arc<FittedPipeline>,
}

static_assertions::assert_impl_all!(Predictor: Send, Sync);
static_assertions::assert_impl_all!(FittedPipeline: Send, Sync);

impl Predictor {
    pub fn new(pipeline: FittedPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Load a private handle from an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FittedPipeline::load(path)?))
    }

    /// Process-wide handle for the artifact at `path`, loaded on first use.
    pub fn shared(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GpaLearningError::ArtifactNotFound {
                path: path.display().to_string(),
            });
        }
        let key = std::fs::canonicalize(path)?;

        if let Some(predictor) = SHARED.read().get(&key) {
            return Ok(predictor.clone());
        }

        let loaded = Self::load(&key)?;
        let mut cache = SHARED.write();
        let predictor = cache.entry(key).or_insert(loaded).clone();
        debug!("Shared predictor ready ({} cached)", cache.len());
        Ok(predictor)
    }

    /// Drop the cached handle for `path` so the next [`shared`](Self::shared)
    /// call reloads it. Existing clones keep the old model.
    pub fn evict(path: impl AsRef<Path>) {
        if let Ok(key) = std::fs::canonicalize(path) {
            SHARED.write().remove(&key);
        }
    }

    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        self.pipeline.predict(df)
    }

    pub fn predict_record(&self, record: &serde_json::Value) -> Result<f64> {
        self.pipeline.predict_record(record)
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    /// Whether two handles share the same loaded model.
    pub fn ptr_eq(&self, other: &Predictor) -> bool {
        Arc::ptr_eq(&self.pipeline, &other.pipeline)
    }
}

impl From<FittedPipeline> for Predictor {
    fn from(pipeline: FittedPipeline) -> Self {
        Self::new(pipeline)
    }
}
