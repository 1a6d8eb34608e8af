//! Categorical stage: sentinel imputation followed by one-hot encoding.

use crate::config::UnknownCategoryPolicy;
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::utils::string_column;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Learned category list for one column, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumnState {
    pub name: String,
    pub categories: Vec<String>,
}

impl CategoricalColumnState {
    /// Indicator position of `value`, if it was seen at training time.
    #[inline]
    pub fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Unfitted one-hot encoder over a fixed list of columns.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    missing_category: String,
    unknown_categories: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    pub fn new(
        columns: Vec<String>,
        missing_category: impl Into<String>,
        unknown_categories: UnknownCategoryPolicy,
    ) -> Self {
        Self {
            columns,
            missing_category: missing_category.into(),
            unknown_categories,
        }
    }

    /// Learn the category set of every column after sentinel imputation.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedOneHotEncoder> {
        let mut states = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let raw = string_column(df, name)
                .context(format!("Fitting categorical column '{}'", name))?;
            let filled = StatisticalImputer::fill_categorical(raw, &self.missing_category);
            let categories: Vec<String> = filled
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            debug!("Column '{}': {} categories", name, categories.len());
            states.push(CategoricalColumnState {
                name: name.clone(),
                categories,
            });
        }

        Ok(FittedOneHotEncoder {
            columns: states,
            missing_category: self.missing_category.clone(),
            unknown_categories: self.unknown_categories,
        })
    }
}

/// Frozen one-hot encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    pub columns: Vec<CategoricalColumnState>,
    pub missing_category: String,
    pub unknown_categories: UnknownCategoryPolicy,
}

impl FittedOneHotEncoder {
    /// Total number of indicator columns.
    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// Indicator names in output order, e.g. `Gender=Female`.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| c.categories.iter().map(move |v| format!("{}={}", c.name, v)))
            .collect()
    }

    /// Write indicator blocks into `out[.., offset..offset + width()]`.
    ///
    /// The target region must be zeroed. Unseen values leave their block at
    /// zero unless the policy is [`UnknownCategoryPolicy::Error`].
    pub fn transform_into(
        &self,
        df: &DataFrame,
        out: &mut Array2<f64>,
        offset: usize,
    ) -> Result<()> {
        let mut block_start = offset;

        for state in &self.columns {
            let raw = string_column(df, &state.name)?;
            for (row, value) in raw.into_iter().enumerate() {
                let value = value.unwrap_or_else(|| self.missing_category.clone());
                match state.position(&value) {
                    Some(pos) => out[[row, block_start + pos]] = 1.0,
                    None => {
                        if self.unknown_categories == UnknownCategoryPolicy::Error {
                            return Err(PreprocessingError::UnknownCategory {
                                column: state.name.clone(),
                                value,
                            });
                        }
                        debug!("Unseen category '{}' in column '{}'", value, state.name);
                    }
                }
            }
            block_start += state.categories.len();
        }

        Ok(())
    }
}
