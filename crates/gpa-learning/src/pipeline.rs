//! Training pipeline implementation.
//!
//! [`TrainingPipeline`] runs the full fit on a student table:
//!
//! 1. Validate the configuration and require the target column
//! 2. Drop identifier columns, separate features from the target
//! 3. Seeded train/test split
//! 4. Classify features and fit the preprocessor on the training rows
//! 5. Grow the random forest
//! 6. Score the held-out rows
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_learning::{TrainingConfig, TrainingPipeline};
//!
//! let pipeline = TrainingPipeline::builder()
//!     .config(TrainingConfig::default())
//!     .on_progress(|update| println!("[{}] {}", update.stage, update.message))
//!     .build()?;
//!
//! let fitted = pipeline.train_csv("data/student_sleep_academic_performance.csv")?;
//! println!("{}", fitted.training_result().metrics);
//! fitted.save("model/model.json")?;
//! ```

use crate::config::TrainingConfig;
use crate::error::{GpaLearningError, Result};
use crate::forest::RandomForestRegressor;
use crate::metrics::RegressionMetrics;
use crate::model::FittedPipeline;
use crate::progress::{ProgressCallback, ProgressUpdate, TrainingStage};
use crate::split::train_test_split;
use crate::types::TrainingResult;
use gpa_processing::{
    FeatureClassifier, Preprocessor, UnknownCategoryPolicy, load_csv, numeric_column,
};
use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Trains a [`FittedPipeline`] from a table.
pub struct TrainingPipeline {
    config: TrainingConfig,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for TrainingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingPipeline")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TrainingPipeline {
    #[must_use]
    pub fn builder() -> TrainingPipelineBuilder {
        TrainingPipelineBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn report(&self, stage: TrainingStage, progress: f64, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        if let Some(callback) = &self.progress_callback {
            callback(ProgressUpdate::new(stage, progress, message));
        }
    }

    /// Load a CSV file and train on it.
    pub fn train_csv(&self, path: impl AsRef<Path>) -> Result<FittedPipeline> {
        let df = load_csv(path)?;
        self.train(&df)
    }

    /// Fit preprocessor and forest on `df` and score the held-out split.
    ///
    /// # Errors
    ///
    /// - [`GpaLearningError::TargetNotFound`] before any fitting if the target is absent
    /// - [`GpaLearningError::InvalidData`] if the target has missing or non-numeric
    ///   values, no feature columns remain, or there are fewer than two rows
    pub fn train(&self, df: &DataFrame) -> Result<FittedPipeline> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;

        self.report(TrainingStage::Initializing, 0.0, "Validating training table");
        let target = config.target_column.as_str();
        if df.column(target).is_err() {
            return Err(GpaLearningError::TargetNotFound(target.to_string()));
        }

        let y_all = target_values(df, target)?;

        let mut features = df.drop(target)?;
        for id in &config.id_columns {
            if features.column(id).is_ok() {
                features = features.drop(id)?;
            }
        }
        if features.width() == 0 {
            return Err(GpaLearningError::InvalidData(
                "no feature columns remain after removing target and identifiers".to_string(),
            ));
        }

        self.report(
            TrainingStage::Splitting,
            0.1,
            format!("Splitting {} rows (test size {})", df.height(), config.test_size),
        );
        let (x_train, x_test, split) =
            train_test_split(&features, config.test_size, config.split_seed)?;
        let y_train = Array1::from_iter(split.train.iter().map(|&i| y_all[i]));
        let y_test: Vec<f64> = split.test.iter().map(|&i| y_all[i]).collect();

        self.report(TrainingStage::Preprocessing, 0.2, "Fitting feature preprocessor");
        let roles = FeatureClassifier::classify(&x_train, &[]);
        info!(
            "Numeric features: {:?}; categorical features: {:?}",
            roles.numeric, roles.categorical
        );
        let mut warnings = Vec::new();
        let preprocessor =
            Preprocessor::new(roles, config.preprocessing.clone()).fit(&x_train, &mut warnings)?;
        let x_train_matrix = preprocessor.transform(&x_train)?;

        self.report(
            TrainingStage::Training,
            0.4,
            format!(
                "Training random forest ({} trees) on {} x {} features",
                config.forest.n_estimators,
                x_train_matrix.nrows(),
                x_train_matrix.ncols()
            ),
        );
        let mut forest = RandomForestRegressor::new(config.forest.clone());
        forest.fit(&x_train_matrix, &y_train)?;

        self.report(TrainingStage::Evaluation, 0.9, "Evaluating on held-out rows");
        // Held-out rows may carry categories the training rows never saw.
        let mut scoring = preprocessor.clone();
        scoring.categorical.unknown_categories = UnknownCategoryPolicy::Ignore;
        let x_test_matrix = scoring.transform(&x_test)?;
        let y_pred = forest.predict(&x_test_matrix)?.to_vec();
        let metrics = RegressionMetrics::compute(&y_test, &y_pred)?;

        let mut feature_importance: Vec<(String, f64)> = preprocessor
            .feature_names()
            .into_iter()
            .zip(forest.feature_importances().iter().copied())
            .collect();
        feature_importance.sort_by(|a, b| b.1.total_cmp(&a.1));

        for w in &warnings {
            warn!("{}", w);
        }

        let result = TrainingResult {
            target_column: target.to_string(),
            n_train_rows: split.train.len(),
            n_test_rows: split.test.len(),
            feature_columns: preprocessor.roles.feature_names().cloned().collect(),
            n_features_out: preprocessor.n_features_out(),
            metrics,
            feature_importance,
            training_time_seconds: started.elapsed().as_secs_f64(),
            warnings,
        };

        self.report(
            TrainingStage::Complete,
            1.0,
            format!(
                "Training complete: MAE {:.4}, RMSE {:.4}, R² {:.4}",
                metrics.mae, metrics.rmse, metrics.r2
            ),
        );

        Ok(FittedPipeline::new(
            preprocessor,
            forest,
            config.clone(),
            result,
        ))
    }
}

fn target_values(df: &DataFrame, target: &str) -> Result<Vec<f64>> {
    let values = numeric_column(df, target).map_err(|e| {
        GpaLearningError::InvalidData(format!("target column '{}' is not numeric: {}", target, e))
    })?;

    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(GpaLearningError::InvalidData(format!(
            "target column '{}' has {} missing values",
            target, missing
        )));
    }
    Ok(values.into_iter().flatten().collect())
}

/// Builder for [`TrainingPipeline`].
#[derive(Default)]
pub struct TrainingPipelineBuilder {
    config: Option<TrainingConfig>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for TrainingPipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingPipelineBuilder")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl TrainingPipelineBuilder {
    /// Use `config` instead of [`TrainingConfig::default()`].
    #[must_use]
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register a callback receiving a [`ProgressUpdate`] at each stage.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(std::sync::Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<TrainingPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(TrainingPipeline {
            config,
            progress_callback: self.progress_callback,
        })
    }
}
