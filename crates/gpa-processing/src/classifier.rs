//! Feature role classification.
//!
//! Partitions the feature columns of a training table into numeric and
//! categorical sets from their storage dtype. The resulting [`FeatureRoles`]
//! is frozen into the fitted preprocessor and never recomputed from
//! inference-time data.

use crate::utils::{is_numeric_dtype, missing_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Role of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Imputed with the median, then standardized.
    Numeric,
    /// Imputed with the missing sentinel, then one-hot encoded.
    Categorical,
}

impl ColumnRole {
    /// Role implied by a storage dtype: integers and floats are numeric,
    /// everything else is categorical.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnRole::Numeric
        } else {
            ColumnRole::Categorical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disjoint, ordered lists of numeric and categorical feature names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRoles {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureRoles {
    /// All feature names, numeric first, in fit order.
    pub fn feature_names(&self) -> impl Iterator<Item = &String> {
        self.numeric.iter().chain(self.categorical.iter())
    }

    /// Role assigned to `name`, if it is a feature.
    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        if self.numeric.iter().any(|c| c == name) {
            Some(ColumnRole::Numeric)
        } else if self.categorical.iter().any(|c| c == name) {
            Some(ColumnRole::Categorical)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature columns absent from `df`.
    pub fn missing_from(&self, df: &DataFrame) -> Vec<String> {
        missing_columns(df, self.feature_names())
    }
}

/// Derives [`FeatureRoles`] from a training table.
pub struct FeatureClassifier;

impl FeatureClassifier {
    /// Classify every column of `df` except those named in `excluded`.
    ///
    /// Each remaining column lands in exactly one list, in table order.
    pub fn classify(df: &DataFrame, excluded: &[String]) -> FeatureRoles {
        let mut roles = FeatureRoles::default();

        for column in df.get_columns() {
            let name = column.name().as_str();
            if excluded.iter().any(|e| e == name) {
                continue;
            }

            let role = ColumnRole::from_dtype(column.dtype());
            debug!("Column '{}' ({}) -> {}", name, column.dtype(), role);

            match role {
                ColumnRole::Numeric => roles.numeric.push(name.to_string()),
                ColumnRole::Categorical => roles.categorical.push(name.to_string()),
            }
        }

        roles
    }
}
