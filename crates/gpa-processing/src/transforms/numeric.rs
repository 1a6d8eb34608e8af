//! Numeric stage: median imputation followed by standardization.

use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::utils::{numeric_chunked, numeric_column};
use ndarray::{Array2, ArrayViewMut1};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Learned state for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnState {
    pub name: String,
    /// Median of the present training values.
    pub median: f64,
    /// Mean after imputation.
    pub mean: f64,
    /// Population standard deviation after imputation.
    pub std: f64,
}

impl NumericColumnState {
    /// Standardized value for a raw (possibly missing) input.
    ///
    /// A zero-variance column maps every input to 0.
    #[inline]
    pub fn scale(&self, value: Option<f64>) -> f64 {
        let filled = value.unwrap_or(self.median);
        if self.std == 0.0 {
            0.0
        } else {
            (filled - self.mean) / self.std
        }
    }
}

/// Unfitted numeric transform over a fixed list of columns.
#[derive(Debug, Clone)]
pub struct NumericTransformer {
    columns: Vec<String>,
}

impl NumericTransformer {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Learn median, mean and std for every column.
    ///
    /// A column with no present values gets a median of 0 and a warning is
    /// appended to `warnings`.
    pub fn fit(
        &self,
        df: &DataFrame,
        warnings: &mut Vec<String>,
    ) -> Result<FittedNumericTransformer> {
        let mut states = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let raw = numeric_chunked(df, name)
                .context(format!("Fitting numeric column '{}'", name))?;

            let median = match StatisticalImputer::median(&raw) {
                Some(m) => m,
                None => {
                    let msg = format!("Column '{}' has no values; imputing with 0", name);
                    warn!("{}", msg);
                    warnings.push(msg);
                    0.0
                }
            };

            let filled = StatisticalImputer::fill_numeric(&raw, median)?;
            let (mean, std) = moments(&filled);
            if std == 0.0 {
                debug!("Column '{}' has zero variance; it will encode as 0", name);
            }

            states.push(NumericColumnState {
                name: name.clone(),
                median,
                mean,
                std,
            });
        }

        Ok(FittedNumericTransformer { columns: states })
    }
}

/// Frozen numeric transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNumericTransformer {
    pub columns: Vec<NumericColumnState>,
}

impl FittedNumericTransformer {
    /// Number of output columns (one per input column).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Write standardized values into `out[.., offset..offset + width()]`.
    pub fn transform_into(
        &self,
        df: &DataFrame,
        out: &mut Array2<f64>,
        offset: usize,
    ) -> Result<()> {
        for (j, state) in self.columns.iter().enumerate() {
            let raw = numeric_column(df, &state.name)?;
            let mut target: ArrayViewMut1<f64> = out.column_mut(offset + j);
            for (cell, value) in target.iter_mut().zip(raw) {
                *cell = state.scale(value);
            }
        }
        Ok(())
    }
}

/// Mean and population standard deviation of an imputed column.
fn moments(filled: &Float64Chunked) -> (f64, f64) {
    let mean = filled.mean().unwrap_or(0.0);
    let std = filled.std(0).unwrap_or(0.0);
    // Summation residue on a constant column still counts as zero variance.
    if std <= f64::EPSILON * mean.abs().max(1.0) {
        (mean, 0.0)
    } else {
        (mean, std)
    }
}
