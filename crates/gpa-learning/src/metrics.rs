//! Regression metrics.

use crate::error::{GpaLearningError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores of a regressor on a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute MAE, MSE, RMSE and R².
    ///
    /// When the true values are constant, R² is 1.0 for a perfect fit and
    /// 0.0 otherwise.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(GpaLearningError::ShapeMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(GpaLearningError::InvalidData(
                "cannot score an empty evaluation set".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (t, p) in y_true.iter().zip(y_pred) {
            let diff = t - p;
            abs_sum += diff.abs();
            sq_sum += diff * diff;
        }

        let mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
        let r2 = if ss_tot == 0.0 {
            if sq_sum == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - sq_sum / ss_tot
        };

        let mse = sq_sum / n;
        Ok(Self {
            mae: abs_sum / n,
            mse,
            rmse: mse.sqrt(),
            r2,
        })
    }
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAE : {:.4}", self.mae)?;
        writeln!(f, "RMSE: {:.4}", self.rmse)?;
        write!(f, "R²  : {:.4}", self.r2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_hand_computed_values() {
        let y_true = [3.0, 2.0, 4.0, 1.0];
        let y_pred = [2.5, 2.0, 5.0, 1.5];
        let m = RegressionMetrics::compute(&y_true, &y_pred).unwrap();

        // errors: 0.5, 0, -1, -0.5
        assert!(close(m.mae, 0.5));
        assert!(close(m.mse, 0.375));
        assert!(close(m.rmse, 0.375_f64.sqrt()));
        // mean 2.5, ss_tot 5.0, ss_res 1.5
        assert!(close(m.r2, 0.7));
    }

    #[test]
    fn test_perfect_fit() {
        let y = [1.0, 2.0, 3.0];
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_constant_target() {
        let y = [2.0, 2.0];
        assert_eq!(RegressionMetrics::compute(&y, &y).unwrap().r2, 1.0);
        assert_eq!(RegressionMetrics::compute(&y, &[2.0, 3.0]).unwrap().r2, 0.0);
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        assert!(matches!(
            RegressionMetrics::compute(&[1.0], &[1.0, 2.0]),
            Err(GpaLearningError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            RegressionMetrics::compute(&[], &[]),
            Err(GpaLearningError::InvalidData(_))
        ));
    }

    #[test]
    fn test_display_lists_three_scores() {
        let m = RegressionMetrics {
            mae: 0.1,
            mse: 0.04,
            rmse: 0.2,
            r2: 0.9,
        };
        assert_eq!(m.to_string(), "MAE : 0.1000\nRMSE: 0.2000\nR²  : 0.9000");
    }
}
