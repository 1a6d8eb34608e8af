//! Fitted pipeline: preprocessor + forest, with inference and persistence.
//!
//! This module provides [`FittedPipeline`], the single reusable unit produced
//! by training. It supports:
//!
//! - **Batch prediction** via [`predict()`](FittedPipeline::predict)
//! - **Single-record prediction** via [`predict_record()`](FittedPipeline::predict_record)
//! - **Serialization** via [`save()`](FittedPipeline::save), [`load()`](FittedPipeline::load),
//!   [`to_bytes()`](FittedPipeline::to_bytes), and [`from_bytes()`](FittedPipeline::from_bytes)
//! - **Introspection** via [`info()`](FittedPipeline::info)
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_learning::FittedPipeline;
//!
//! let pipeline = FittedPipeline::load("model/model.json")?;
//! let gpa = pipeline.predict_record(&serde_json::json!({
//!     "Age": 22,
//!     "Gender": "Female",
//!     "Academic_Year": "2nd"
//! }))?;
//! println!("Predicted GPA: {:.2}", gpa);
//! ```
//!
//! # Artifact format
//!
//! The artifact is a JSON document:
//!
//! ```text
//! { "format": "gpa-pipeline", "format_version": 1, "created_at": "...", "pipeline": { ... } }
//! ```
//!
//! The header is checked before the body is decoded, so an artifact written by
//! a newer build fails with [`GpaLearningError::IncompatibleArtifact`].

use crate::config::TrainingConfig;
use crate::error::{GpaLearningError, Result};
use crate::forest::RandomForestRegressor;
use crate::types::{ModelInfo, TrainingResult};
use gpa_processing::FittedPreprocessor;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Identifier stored in every artifact.
pub const ARTIFACT_FORMAT: &str = "gpa-pipeline";

/// Current artifact layout version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

const MODEL_NAME: &str = "random_forest";

/// A trained preprocessing + regression pipeline ready for inference.
///
/// Immutable once built; share it across threads through
/// [`Predictor`](crate::Predictor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    preprocessor: FittedPreprocessor,
    forest: RandomForestRegressor,
    config: TrainingConfig,
    training: TrainingResult,
    created_at: String,
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format: &'a str,
    format_version: u32,
    created_at: &'a str,
    pipeline: &'a FittedPipeline,
}

#[derive(Deserialize)]
struct ArtifactHeader {
    format: String,
    format_version: u32,
}

#[derive(Deserialize)]
struct Artifact {
    pipeline: FittedPipeline,
}

impl FittedPipeline {
    pub(crate) fn new(
        preprocessor: FittedPreprocessor,
        forest: RandomForestRegressor,
        config: TrainingConfig,
        training: TrainingResult,
    ) -> Self {
        Self {
            preprocessor,
            forest,
            config,
            training,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    // ------------------------------------------------------------------
    // Inference
    // ------------------------------------------------------------------

    /// Assemble the feature matrix for `df` with the frozen preprocessor.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        Ok(self.preprocessor.transform(df)?)
    }

    /// Predict one GPA per row of `df`.
    ///
    /// Every training feature column must be present; extra columns are
    /// ignored. Missing columns fail with a schema mismatch that lists them all.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let x = self.transform(df)?;
        let predictions = self.forest.predict(&x)?;
        debug!("Predicted {} rows", predictions.len());
        Ok(predictions.to_vec())
    }

    /// Predict a single record given as a JSON object of column name to value.
    pub fn predict_record(&self, record: &serde_json::Value) -> Result<f64> {
        let df = record_to_frame(record)?;
        let predictions = self.predict(&df)?;
        predictions.first().copied().ok_or_else(|| {
            GpaLearningError::InvalidData("prediction returned no rows".to_string())
        })
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Raw feature columns required at inference, numeric first.
    pub fn feature_columns(&self) -> Vec<String> {
        self.preprocessor.roles.feature_names().cloned().collect()
    }

    pub fn target_column(&self) -> &str {
        &self.config.target_column
    }

    pub fn preprocessor(&self) -> &FittedPreprocessor {
        &self.preprocessor
    }

    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Summary of the run that produced this pipeline.
    pub fn training_result(&self) -> &TrainingResult {
        &self.training
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: MODEL_NAME.to_string(),
            target_column: self.config.target_column.clone(),
            numeric_features: self.preprocessor.roles.numeric.clone(),
            categorical_features: self.preprocessor.roles.categorical.clone(),
            n_features_out: self.preprocessor.n_features_out(),
            n_trees: self.forest.n_trees(),
            metrics: self.training.metrics,
            created_at: self.created_at.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the pipeline into artifact bytes.
    #[must_use = "returns serialized pipeline bytes; use them or handle the error"]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let artifact = ArtifactRef {
            format: ARTIFACT_FORMAT,
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: &self.created_at,
            pipeline: self,
        };
        Ok(serde_json::to_vec(&artifact)?)
    }

    /// Decode artifact bytes produced by [`to_bytes()`](Self::to_bytes).
    #[must_use = "returns the decoded pipeline; use it or handle the error"]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header: ArtifactHeader = serde_json::from_slice(bytes).map_err(|e| {
            GpaLearningError::IncompatibleArtifact(format!("unreadable artifact header: {}", e))
        })?;

        if header.format != ARTIFACT_FORMAT {
            return Err(GpaLearningError::IncompatibleArtifact(format!(
                "expected format '{}', found '{}'",
                ARTIFACT_FORMAT, header.format
            )));
        }
        if header.format_version > ARTIFACT_FORMAT_VERSION {
            return Err(GpaLearningError::IncompatibleArtifact(format!(
                "format version {} is newer than supported version {}",
                header.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let artifact: Artifact = serde_json::from_slice(bytes)?;
        Ok(artifact.pipeline)
    }

    /// Write the artifact to `path`, creating parent directories.
    ///
    /// The bytes go to a sibling temporary file that is renamed into place,
    /// so a failed save never leaves a truncated artifact at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = self.to_bytes()?;
        let tmp = temp_sibling(path);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Model saved to: {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Load an artifact written by [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`GpaLearningError::ArtifactNotFound`] if `path` does not exist
    /// - [`GpaLearningError::IncompatibleArtifact`] for a foreign or newer artifact
    #[must_use = "returns the loaded pipeline; use it or handle the error"]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GpaLearningError::ArtifactNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path)?;
        let pipeline = Self::from_bytes(&bytes)?;
        info!(
            "Loaded model from {} ({} features, {} trees)",
            path.display(),
            pipeline.preprocessor.roles.len(),
            pipeline.forest.n_trees()
        );
        Ok(pipeline)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Build a one-row frame from a JSON object.
///
/// Numbers become `Float64`, strings `String`, booleans `Boolean` and `null`
/// a null column that the preprocessor imputes.
pub fn record_to_frame(record: &serde_json::Value) -> Result<DataFrame> {
    use serde_json::Value;

    let object = record.as_object().ok_or_else(|| {
        GpaLearningError::InvalidData("record must be a JSON object".to_string())
    })?;

    let mut columns = Vec::with_capacity(object.len());
    for (name, value) in object {
        let series = match value {
            Value::Number(n) => {
                let v = n.as_f64().ok_or_else(|| {
                    GpaLearningError::InvalidData(format!(
                        "field '{}' is not a finite number",
                        name
                    ))
                })?;
                Series::new(name.as_str().into(), [v])
            }
            Value::String(s) => Series::new(name.as_str().into(), [s.as_str()]),
            Value::Bool(b) => Series::new(name.as_str().into(), [*b]),
            Value::Null => Series::new_null(name.as_str().into(), 1),
            Value::Array(_) | Value::Object(_) => {
                return Err(GpaLearningError::InvalidData(format!(
                    "field '{}' must be a scalar",
                    name
                )));
            }
        };
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}
