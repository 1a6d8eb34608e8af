//! Feature Preprocessing Library for the Student GPA Pipeline
//!
//! Turns a raw student table into the dense numeric matrix the regressor
//! trains on, and replays the exact same transformation at inference time.
//!
//! # Overview
//!
//! - **Dataset loading**: CSV with a header row, dtype inference via Polars
//! - **Feature classification**: numeric vs categorical from storage dtype
//! - **Numeric stage**: median imputation, then standardization
//! - **Categorical stage**: `"Missing"` imputation, then one-hot encoding
//! - **Assembly**: `[numeric block | indicator blocks]`, extra columns ignored
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gpa_processing::{FeatureClassifier, PreprocessingConfig, Preprocessor, load_csv};
//!
//! let df = load_csv("data/students.csv")?;
//! let excluded = vec!["Student_ID".to_string(), "GPA (0-4 scale)".to_string()];
//! let roles = FeatureClassifier::classify(&df, &excluded);
//!
//! let mut warnings = Vec::new();
//! let fitted = Preprocessor::new(roles, PreprocessingConfig::default())
//!     .fit(&df, &mut warnings)?;
//!
//! let x = fitted.transform(&df)?;
//! println!("{} rows x {} features", x.nrows(), x.ncols());
//! ```
//!
//! # Unknown categories
//!
//! A category that was never seen during fitting encodes as an all-zero
//! indicator block. Set [`UnknownCategoryPolicy::Error`] to reject such rows
//! with [`PreprocessingError::UnknownCategory`] instead.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod preprocessor;
pub mod transforms;
pub mod utils;

// Re-exports for convenient access
pub use classifier::{ColumnRole, FeatureClassifier, FeatureRoles};
pub use config::{
    ConfigValidationError, MISSING_CATEGORY, PreprocessingConfig, PreprocessingConfigBuilder,
    UnknownCategoryPolicy,
};
pub use dataset::{load_csv, read_csv_str};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use preprocessor::{FittedPreprocessor, Preprocessor};
pub use transforms::{
    CategoricalColumnState, FittedNumericTransformer, FittedOneHotEncoder, NumericColumnState,
    NumericTransformer, OneHotEncoder,
};
pub use utils::{
    DtypeCategory, clean_numeric_string, get_dtype_category, is_numeric_dtype, numeric_chunked,
    numeric_column, parse_numeric_string, string_column,
};
