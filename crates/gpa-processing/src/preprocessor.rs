//! Feature assembler.
//!
//! Combines the numeric and categorical stages into one transform producing
//! a dense matrix laid out as `[numeric block | indicator blocks]`.
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_processing::{FeatureClassifier, PreprocessingConfig, Preprocessor};
//!
//! let roles = FeatureClassifier::classify(&df, &["GPA".to_string()]);
//! let mut warnings = Vec::new();
//! let fitted = Preprocessor::new(roles, PreprocessingConfig::default())
//!     .fit(&df, &mut warnings)?;
//! let x = fitted.transform(&df)?;
//! ```

use crate::classifier::FeatureRoles;
use crate::config::PreprocessingConfig;
use crate::error::{PreprocessingError, Result};
use crate::transforms::{
    FittedNumericTransformer, FittedOneHotEncoder, NumericTransformer, OneHotEncoder,
};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Unfitted feature preprocessor.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    roles: FeatureRoles,
    config: PreprocessingConfig,
}

impl Preprocessor {
    pub fn new(roles: FeatureRoles, config: PreprocessingConfig) -> Self {
        Self { roles, config }
    }

    /// Fit both stages on `df`.
    ///
    /// Non-fatal observations (all-missing numeric columns) are appended to
    /// `warnings`.
    pub fn fit(&self, df: &DataFrame, warnings: &mut Vec<String>) -> Result<FittedPreprocessor> {
        self.config.validate()?;

        let missing = self.roles.missing_from(df);
        if !missing.is_empty() {
            return Err(PreprocessingError::SchemaMismatch { missing });
        }

        info!(
            "Fitting preprocessor: {} numeric, {} categorical columns on {} rows",
            self.roles.numeric.len(),
            self.roles.categorical.len(),
            df.height()
        );

        let numeric = NumericTransformer::new(self.roles.numeric.clone()).fit(df, warnings)?;
        let categorical = OneHotEncoder::new(
            self.roles.categorical.clone(),
            self.config.missing_category.clone(),
            self.config.unknown_categories,
        )
        .fit(df)?;

        let fitted = FittedPreprocessor {
            roles: self.roles.clone(),
            numeric,
            categorical,
        };
        debug!("Preprocessor output width: {}", fitted.n_features_out());
        Ok(fitted)
    }
}

/// Frozen feature preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    pub roles: FeatureRoles,
    pub numeric: FittedNumericTransformer,
    pub categorical: FittedOneHotEncoder,
}

impl FittedPreprocessor {
    /// Width of the assembled matrix.
    pub fn n_features_out(&self) -> usize {
        self.numeric.width() + self.categorical.width()
    }

    /// Names of the assembled output columns.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric.feature_names();
        names.extend(self.categorical.feature_names());
        names
    }

    /// Fail with [`PreprocessingError::SchemaMismatch`] listing every feature
    /// column absent from `df`. Extra columns are fine.
    pub fn validate_schema(&self, df: &DataFrame) -> Result<()> {
        let missing = self.roles.missing_from(df);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PreprocessingError::SchemaMismatch { missing })
        }
    }

    /// Assemble the feature matrix for `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        self.validate_schema(df)?;

        let mut out = Array2::zeros((df.height(), self.n_features_out()));
        self.numeric.transform_into(df, &mut out, 0)?;
        self.categorical
            .transform_into(df, &mut out, self.numeric.width())?;
        Ok(out)
    }
}
