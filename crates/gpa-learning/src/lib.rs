//! gpa-learning: random-forest GPA regression on student lifestyle data.
//!
//! This crate trains a seeded random-forest regressor on the feature matrix
//! produced by `gpa-processing`, scores it on a held-out split, and persists
//! the whole fitted pipeline (preprocessor plus forest) as one JSON artifact
//! that can be reloaded for inference.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gpa_learning::{FittedPipeline, TrainingConfig, TrainingPipeline};
//!
//! let config = TrainingConfig::builder()
//!     .n_estimators(200)
//!     .random_seed(42)
//!     .build()?;
//!
//! let pipeline = TrainingPipeline::builder()
//!     .config(config)
//!     .on_progress(|u| println!("{:.0}% - {}", u.progress * 100.0, u.message))
//!     .build()?;
//!
//! let fitted = pipeline.train_csv("data/student_sleep_academic_performance.csv")?;
//! println!("{}", fitted.training_result().metrics);
//! fitted.save("model/model.json")?;
//!
//! // Later, possibly in another process
//! let model = FittedPipeline::load("model/model.json")?;
//! let gpa = model.predict_record(&serde_json::json!({
//!     "Age": 22, "Gender": "Female", "Academic_Year": "2nd"
//! }))?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! CSV ──► FeatureClassifier ──► Preprocessor ──► RandomForestRegressor
//!                                    │                    │
//!                                    └──── FittedPipeline ┘ ──► save / load
//!                                               │
//!                                               ▼
//!                                      Predictor (Arc, shared)
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`LearningResult<T>`]. Preprocessing
//! failures, including a schema mismatch at inference, surface as
//! [`GpaLearningError::Preprocessing`] and keep their processing error code.
//!
//! # Determinism
//!
//! The split, bootstrap samples and per-node feature sampling are all driven
//! by seeded ChaCha generators. Training the same table with the same config
//! yields bit-identical predictions regardless of thread count.

mod config;
mod error;
pub mod forest;
mod metrics;
mod model;
mod pipeline;
mod predictor;
mod progress;
mod split;
mod types;

// Configuration types
pub use config::{
    DEFAULT_ID_COLUMN, DEFAULT_TARGET_COLUMN, ForestParams, MaxFeatures, TrainingConfig,
    TrainingConfigBuilder,
};
// Error types
pub use error::{GpaLearningError, Result as LearningResult};
// Estimator
pub use forest::RandomForestRegressor;
// Scores
pub use metrics::RegressionMetrics;
// Fitted artifact
pub use model::{ARTIFACT_FORMAT, ARTIFACT_FORMAT_VERSION, FittedPipeline, record_to_frame};
// Training
pub use pipeline::{TrainingPipeline, TrainingPipelineBuilder};
// Inference handle
pub use predictor::Predictor;
// Progress reporting types
pub use progress::{ProgressCallback, ProgressUpdate, TrainingStage};
// Splitting
pub use split::{SplitIndices, train_test_split};
// Result types
pub use types::{ModelInfo, TrainingResult};
