//! Error types for the gpa-learning crate.
//!
//! This module defines [`GpaLearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, GpaLearningError>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_learning::{GpaLearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, GpaLearningError> {
//!     // Errors are automatically propagated with ?
//!     let config = TrainingConfig::builder()
//!         .target_column("GPA (0-4 scale)")
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use gpa_processing::PreprocessingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for gpa-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GpaLearningError {
    /// Invalid configuration provided to the pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or evaluation.
    ///
    /// Common causes:
    /// - Target column contains missing values
    /// - Too few rows to split into train and test sets
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The target column was not found in the training table.
    ///
    /// Raised before any fitting takes place.
    #[error("Target column '{0}' not found")]
    TargetNotFound(String),

    /// Training failed inside the regressor.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// No pipeline artifact exists at the given path.
    #[error("Model artifact not found: {path}")]
    ArtifactNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The artifact exists but was written in a format this build cannot read.
    #[error("Incompatible model artifact: {0}")]
    IncompatibleArtifact(String),

    /// Feature matrix and target (or fitted width) disagree.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Error raised by the feature preprocessor.
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpaLearningError {
    /// Get error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::IncompatibleArtifact(_) => "INCOMPATIBLE_ARTIFACT",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::Preprocessing(e) => e.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the failure was caused by the rows passed to a prediction call.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Preprocessing(e) => e.is_input_error(),
            Self::ShapeMismatch { .. } => true,
            _ => false,
        }
    }
}

impl Serialize for GpaLearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("GpaLearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, GpaLearningError>;
