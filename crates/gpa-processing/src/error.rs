//! Custom error types for feature preprocessing.
//!
//! This module provides the error hierarchy used by the dataset loader, the
//! feature classifier and the fitted transforms, built with `thiserror`.
//!
//! Errors are serializable so that a caller (CLI `--json` output, a UI
//! collaborator) can display them with a stable `code` field.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for preprocessing.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// The dataset file does not exist.
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    /// The dataset has no rows.
    #[error("Dataset '{0}' contains no rows")]
    EmptyDataset(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// An inference table is missing one or more feature columns seen at training time.
    #[error("Input is missing required feature columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A column could not be read with the role fixed at training time.
    #[error("Column '{column}' must hold {expected} values, found {found}")]
    FeatureTypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A categorical value never seen at training time (strict policy only).
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DatasetNotFound(_) => "DATASET_NOT_FOUND",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::FeatureTypeMismatch { .. } => "FEATURE_TYPE_MISMATCH",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix the input and retry the same call.
    ///
    /// Input-shaped failures never touch fitted state, so a corrected row
    /// can be submitted against the same pipeline.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::SchemaMismatch { .. }
            | Self::FeatureTypeMismatch { .. }
            | Self::UnknownCategory { .. } => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreprocessingError::ColumnNotFound("Age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PreprocessingError::SchemaMismatch {
                missing: vec!["Age".to_string()]
            }
            .error_code(),
            "SCHEMA_MISMATCH"
        );
    }

    #[test]
    fn test_schema_mismatch_lists_every_column() {
        let error = PreprocessingError::SchemaMismatch {
            missing: vec!["Age".to_string(), "Gender".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Input is missing required feature columns: Age, Gender"
        );
    }

    #[test]
    fn test_is_input_error() {
        assert!(
            PreprocessingError::UnknownCategory {
                column: "Gender".to_string(),
                value: "NonBinary".to_string(),
            }
            .is_input_error()
        );
        assert!(!PreprocessingError::DatasetNotFound("x.csv".to_string()).is_input_error());
        assert!(
            PreprocessingError::SchemaMismatch { missing: vec![] }
                .with_context("During inference")
                .is_input_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = PreprocessingError::ColumnNotFound("Age".to_string())
            .with_context("While fitting numeric transform");
        assert!(error.to_string().contains("While fitting numeric transform"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
