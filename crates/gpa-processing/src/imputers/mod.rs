//! Imputation module for handling missing values.
//!
//! Statistical imputation (median for numeric columns, a constant sentinel
//! for categorical columns).

mod statistical;

pub use statistical::StatisticalImputer;
