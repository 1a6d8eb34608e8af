//! Statistical imputation methods.
//!
//! Median imputation for numeric columns and constant-sentinel imputation for
//! categorical columns.

use crate::error::Result;
use polars::prelude::*;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Median of the present values, or `None` if every value is missing.
    pub fn median(values: &Float64Chunked) -> Option<f64> {
        values.median()
    }

    /// Replace missing numeric values with `fill_value`.
    pub fn fill_numeric(values: &Float64Chunked, fill_value: f64) -> Result<Float64Chunked> {
        Ok(values.fill_null_with_values(fill_value)?)
    }

    /// Replace missing categorical values with `sentinel`.
    pub fn fill_categorical(values: Vec<Option<String>>, sentinel: &str) -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| sentinel.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunked(values: &[Option<f64>]) -> Float64Chunked {
        Float64Chunked::from_slice_options("values".into(), values)
    }

    // ========================================================================
    // median() tests
    // ========================================================================

    #[test]
    fn test_median_odd() {
        let values = chunked(&[Some(5.0), None, Some(1.0), Some(3.0)]);
        assert_eq!(StatisticalImputer::median(&values), Some(3.0));
    }

    #[test]
    fn test_median_even() {
        let values = chunked(&[Some(1.0), Some(3.0), None]);
        assert_eq!(StatisticalImputer::median(&values), Some(2.0));
    }

    #[test]
    fn test_median_single_value() {
        let values = chunked(&[Some(42.0), None, None]);
        assert_eq!(StatisticalImputer::median(&values), Some(42.0));
    }

    #[test]
    fn test_median_all_missing() {
        let values = chunked(&[None, None, None]);
        assert_eq!(StatisticalImputer::median(&values), None);
    }

    // ========================================================================
    // fill tests
    // ========================================================================

    #[test]
    fn test_fill_numeric_preserves_present_values() {
        let values = chunked(&[Some(10.0), None, Some(20.0)]);
        let filled = StatisticalImputer::fill_numeric(&values, 15.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(
            filled.into_iter().collect::<Vec<_>>(),
            vec![Some(10.0), Some(15.0), Some(20.0)]
        );
    }

    #[test]
    fn test_fill_categorical_uses_sentinel() {
        let values = vec![None, Some("A".to_string()), None];
        assert_eq!(
            StatisticalImputer::fill_categorical(values, "Missing"),
            vec!["Missing", "A", "Missing"]
        );
    }
}
