//! Result types returned by training and artifact inspection.

use crate::metrics::RegressionMetrics;
use serde::{Deserialize, Serialize};

/// Summary of a completed training run.
///
/// Returned alongside the fitted pipeline and printed by the CLI. Also
/// embedded in the saved artifact so `ModelInfo` can report held-out scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TrainingResult {
    /// Name of the regression target.
    pub target_column: String,

    /// Rows used to fit the preprocessor and forest.
    pub n_train_rows: usize,

    /// Rows held out for evaluation.
    pub n_test_rows: usize,

    /// Raw feature columns, numeric first.
    pub feature_columns: Vec<String>,

    /// Width of the assembled feature matrix.
    pub n_features_out: usize,

    /// Held-out scores.
    pub metrics: RegressionMetrics,

    /// Assembled feature name and importance, sorted by importance (descending).
    pub feature_importance: Vec<(String, f64)>,

    /// Wall-clock training time in seconds.
    pub training_time_seconds: f64,

    /// Non-fatal observations made during training.
    pub warnings: Vec<String>,
}

impl TrainingResult {
    /// The `n` most important assembled features.
    pub fn top_features(&self, n: usize) -> &[(String, f64)] {
        &self.feature_importance[..n.min(self.feature_importance.len())]
    }
}

/// Introspection data for a fitted pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ModelInfo {
    pub model_name: String,
    pub target_column: String,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub n_features_out: usize,
    pub n_trees: usize,
    pub metrics: RegressionMetrics,
    pub created_at: String,
}
