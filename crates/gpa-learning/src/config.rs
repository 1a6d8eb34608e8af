//! Configuration types for the training pipeline.
//!
//! This module provides [`TrainingConfig`] and its builder, the forest
//! hyperparameters in [`ForestParams`] and the [`MaxFeatures`] strategy.
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .target_column("GPA (0-4 scale)")
//!     .test_size(0.2)
//!     .n_estimators(200)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::GpaLearningError;
use gpa_processing::{PreprocessingConfig, UnknownCategoryPolicy};
use serde::{Deserialize, Serialize};

/// Target column of the student sleep / academic performance dataset.
pub const DEFAULT_TARGET_COLUMN: &str = "GPA (0-4 scale)";

/// Identifier column dropped before training.
pub const DEFAULT_ID_COLUMN: &str = "Student_ID";

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum MaxFeatures {
    /// `sqrt(n_features)`
    Sqrt,
    /// `log2(n_features)`
    Log2,
    /// A fraction of the features, in `(0, 1]`.
    Fraction(f64),
    /// A fixed count, capped at the number of features.
    Fixed(usize),
    /// Every feature.
    #[default]
    All,
}

impl MaxFeatures {
    /// Concrete feature count for a matrix with `n_features` columns.
    ///
    /// Always at least 1 and at most `n_features` (for non-empty input).
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => *n,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees. Default: 200
    pub n_estimators: usize,

    /// Maximum tree depth; `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,

    /// Minimum samples required to split an internal node. Default: 2
    pub min_samples_split: usize,

    /// Minimum samples required in each leaf. Default: 1
    pub min_samples_leaf: usize,

    /// Features considered per split. Default: All
    pub max_features: MaxFeatures,

    /// Draw a bootstrap resample per tree. Default: true
    pub bootstrap: bool,

    /// Base seed; tree `i` is seeded with `random_seed + i`. Default: 42
    pub random_seed: u64,

    /// Worker threads for tree building (-1 = all cores, 1 = sequential).
    pub n_jobs: i32,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_seed: 42,
            n_jobs: -1,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), GpaLearningError> {
        if self.n_estimators == 0 {
            return Err(GpaLearningError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if self.max_depth == Some(0) {
            return Err(GpaLearningError::InvalidConfig(
                "max_depth must be at least 1 when set".to_string(),
            ));
        }

        if self.min_samples_split < 2 {
            return Err(GpaLearningError::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        if self.min_samples_leaf == 0 {
            return Err(GpaLearningError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        match self.max_features {
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                return Err(GpaLearningError::InvalidConfig(
                    "max_features fraction must be in (0.0, 1.0]".to_string(),
                ));
            }
            MaxFeatures::Fixed(0) => {
                return Err(GpaLearningError::InvalidConfig(
                    "max_features must be at least 1".to_string(),
                ));
            }
            _ => {}
        }

        if self.n_jobs == 0 || self.n_jobs < -1 {
            return Err(GpaLearningError::InvalidConfig(
                "n_jobs must be -1 (all cores) or a positive number".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the training pipeline.
///
/// Use [`TrainingConfig::builder()`] to create a validated configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Column holding the regression target.
    pub target_column: String,

    /// Identifier columns dropped before training when present.
    pub id_columns: Vec<String>,

    /// Fraction of rows held out for evaluation. Default: 0.2
    pub test_size: f64,

    /// Seed of the train/test shuffle. Default: 42
    pub split_seed: u64,

    pub forest: ForestParams,

    pub preprocessing: PreprocessingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            id_columns: vec![DEFAULT_ID_COLUMN.to_string()],
            test_size: 0.2,
            split_seed: 42,
            forest: ForestParams::default(),
            preprocessing: PreprocessingConfig::default(),
        }
    }
}

impl TrainingConfig {
    #[must_use]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Validate every field, including nested forest and preprocessing settings.
    pub fn validate(&self) -> Result<(), GpaLearningError> {
        if self.target_column.trim().is_empty() {
            return Err(GpaLearningError::InvalidConfig(
                "target_column must not be empty".to_string(),
            ));
        }

        if self.id_columns.contains(&self.target_column) {
            return Err(GpaLearningError::InvalidConfig(format!(
                "target column '{}' cannot also be an identifier column",
                self.target_column
            )));
        }

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(GpaLearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        self.forest.validate()?;
        self.preprocessing
            .validate()
            .map_err(|e| GpaLearningError::InvalidConfig(e.to_string()))?;

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    #[must_use]
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.config.target_column = column.into();
        self
    }

    /// Replace the identifier column list.
    #[must_use]
    pub fn id_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.id_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    #[must_use]
    pub fn split_seed(mut self, seed: u64) -> Self {
        self.config.split_seed = seed;
        self
    }

    /// Set both the split seed and the forest seed.
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.split_seed = seed;
        self.config.forest.random_seed = seed;
        self
    }

    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.forest.n_estimators = n;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.forest.max_depth = depth;
        self
    }

    #[must_use]
    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.config.forest.min_samples_split = n;
        self
    }

    #[must_use]
    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.config.forest.min_samples_leaf = n;
        self
    }

    #[must_use]
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.config.forest.max_features = max_features;
        self
    }

    #[must_use]
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.forest.bootstrap = bootstrap;
        self
    }

    #[must_use]
    pub fn n_jobs(mut self, jobs: i32) -> Self {
        self.config.forest.n_jobs = jobs;
        self
    }

    #[must_use]
    pub fn forest(mut self, params: ForestParams) -> Self {
        self.config.forest = params;
        self
    }

    #[must_use]
    pub fn preprocessing(mut self, config: PreprocessingConfig) -> Self {
        self.config.preprocessing = config;
        self
    }

    /// Shorthand for the strict unknown-category policy.
    #[must_use]
    pub fn strict_categories(mut self, strict: bool) -> Self {
        self.config.preprocessing.unknown_categories = if strict {
            UnknownCategoryPolicy::Error
        } else {
            UnknownCategoryPolicy::Ignore
        };
        self
    }

    pub fn build(self) -> Result<TrainingConfig, GpaLearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.target_column, "GPA (0-4 scale)");
        assert_eq!(config.id_columns, vec!["Student_ID"]);
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.forest.n_estimators, 200);
        assert_eq!(config.forest.random_seed, 42);
        assert_eq!(config.forest.n_jobs, -1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = TrainingConfig::builder()
            .target_column("score")
            .id_columns(["id", "name"])
            .test_size(0.25)
            .random_seed(7)
            .n_estimators(10)
            .max_depth(Some(4))
            .strict_categories(true)
            .build()
            .unwrap();

        assert_eq!(config.target_column, "score");
        assert_eq!(config.id_columns, vec!["id", "name"]);
        assert_eq!(config.split_seed, 7);
        assert_eq!(config.forest.random_seed, 7);
        assert_eq!(config.forest.max_depth, Some(4));
        assert_eq!(
            config.preprocessing.unknown_categories,
            UnknownCategoryPolicy::Error
        );
    }

    #[test]
    fn test_invalid_test_size() {
        for size in [0.0, 1.0, -0.1, 1.5] {
            let result = TrainingConfig::builder().test_size(size).build();
            assert!(matches!(result, Err(GpaLearningError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_forest_params() {
        assert!(TrainingConfig::builder().n_estimators(0).build().is_err());
        assert!(TrainingConfig::builder().max_depth(Some(0)).build().is_err());
        assert!(TrainingConfig::builder().min_samples_split(1).build().is_err());
        assert!(TrainingConfig::builder().min_samples_leaf(0).build().is_err());
        assert!(TrainingConfig::builder().n_jobs(0).build().is_err());
        assert!(
            TrainingConfig::builder()
                .max_features(MaxFeatures::Fraction(1.5))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_target_cannot_be_identifier() {
        let result = TrainingConfig::builder()
            .target_column("Student_ID")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::All.resolve(10), 10);
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::Log2.resolve(10), 3);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(9), 5);
        assert_eq!(MaxFeatures::Fixed(50).resolve(10), 10);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
    }
}
