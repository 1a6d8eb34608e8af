//! Shared utilities for feature preprocessing.
//!
//! Column extraction helpers live here so that fitting and inference read
//! values through exactly the same coercion rules.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Column with no typed values at all
    Null,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else {
        match dtype {
            DataType::Boolean => DtypeCategory::Boolean,
            DataType::String => DtypeCategory::String,
            DataType::Null => DtypeCategory::Null,
            _ => DtypeCategory::Other,
        }
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use gpa_processing::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("1,234.5"), "1234.5");
/// assert_eq!(clean_numeric_string("  90%  "), "90");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like percentages and thousands separators.
/// Non-finite results are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Column Extraction
// =============================================================================

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| PreprocessingError::ColumnNotFound(name.to_string()))
}

/// Read a column as optional `f64` values.
///
/// Integer and float columns are cast directly (NaN counts as missing). Text
/// columns are parsed value by value; blank strings are missing, anything else
/// that fails to parse is a [`PreprocessingError::FeatureTypeMismatch`].
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = lookup(df, name)?;

    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => {
            let cast = series.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(values)
        }
        DtypeCategory::String => series
            .str()?
            .into_iter()
            .map(|v| match v {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_numeric_string(raw).map(Some).ok_or_else(|| {
                    PreprocessingError::FeatureTypeMismatch {
                        column: name.to_string(),
                        expected: "numeric".to_string(),
                        found: format!("'{}'", raw),
                    }
                }),
            })
            .collect(),
        DtypeCategory::Null => Ok(vec![None; series.len()]),
        DtypeCategory::Boolean | DtypeCategory::Other => {
            Err(PreprocessingError::FeatureTypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                found: series.dtype().to_string(),
            })
        }
    }
}

/// Read a column as a `Float64Chunked` through the same coercion rules as
/// [`numeric_column`], so Polars aggregations see exactly the values the
/// transform will later scale.
pub fn numeric_chunked(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let values = numeric_column(df, name)?;
    Ok(Float64Chunked::from_slice_options(name.into(), &values))
}

/// Read a column as optional string values.
///
/// Non-string columns are cast to their string form, so a categorical column
/// that arrives as integers (`2`) is read as `"2"`.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = lookup(df, name)?;

    let strings = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };

    let values: Vec<Option<String>> = strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Names of the given columns that are absent from `df`, in the given order.
pub fn missing_columns<'a, I>(df: &DataFrame, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let present: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();

    names
        .into_iter()
        .filter(|name| !present.contains(&name.as_str()))
        .cloned()
        .collect()
}
