//! Progress reporting types for the training pipeline.
//!
//! This module defines [`TrainingStage`], [`ProgressUpdate`] and the
//! [`ProgressCallback`] type alias.
//!
//! # Example
//!
//! ```rust,ignore
//! use gpa_learning::{ProgressUpdate, TrainingPipeline};
//!
//! let pipeline = TrainingPipeline::builder()
//!     .on_progress(|update: ProgressUpdate| {
//!         println!("[{}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//! ```

use std::fmt;
use std::sync::Arc;

/// The current stage of the training pipeline.
///
/// Stages are reported in declaration order. `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TrainingStage {
    /// Validating configuration and the target column.
    #[default]
    Initializing,

    /// Splitting rows into train and test sets.
    Splitting,

    /// Fitting imputers, scaler and one-hot encoder.
    Preprocessing,

    /// Growing the forest.
    Training,

    /// Scoring the held-out split.
    Evaluation,

    /// Training finished successfully.
    Complete,
}

impl TrainingStage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStage::Initializing => "initializing",
            TrainingStage::Splitting => "splitting",
            TrainingStage::Preprocessing => "preprocessing",
            TrainingStage::Training => "training",
            TrainingStage::Evaluation => "evaluation",
            TrainingStage::Complete => "complete",
        }
    }

    /// Returns `true` for [`Complete`](Self::Complete).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingStage::Complete)
    }
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A progress update from the training pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// The current training stage.
    pub stage: TrainingStage,

    /// Overall progress from 0.0 to 1.0, non-decreasing within a run.
    pub progress: f64,

    /// Human-readable status message.
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: TrainingStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }
}

impl Default for ProgressUpdate {
    fn default() -> Self {
        Self::new(TrainingStage::default(), 0.0, String::new())
    }
}

/// Type alias for a progress callback function.
///
/// Callbacks must be thread-safe (`Send + Sync`) and should return quickly.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_stage_as_str() {
        assert_eq!(TrainingStage::Initializing.as_str(), "initializing");
        assert_eq!(TrainingStage::Splitting.as_str(), "splitting");
        assert_eq!(TrainingStage::Training.to_string(), "training");
    }

    #[test]
    fn test_only_complete_is_terminal() {
        assert!(TrainingStage::Complete.is_terminal());
        assert!(!TrainingStage::Evaluation.is_terminal());
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(ProgressUpdate::new(TrainingStage::Training, 1.7, "x").progress, 1.0);
        assert_eq!(ProgressUpdate::default().progress, 0.0);
    }
}
