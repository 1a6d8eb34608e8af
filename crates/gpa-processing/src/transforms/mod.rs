//! Column transforms.
//!
//! Each transform has an unfitted form that learns state from a training
//! table and a fitted form that applies the frozen state to any table with
//! the same feature columns. Fitted forms write straight into a slice of the
//! output matrix so the assembler never materializes intermediate frames.

pub mod categorical;
pub mod numeric;

pub use categorical::{CategoricalColumnState, FittedOneHotEncoder, OneHotEncoder};
pub use numeric::{FittedNumericTransformer, NumericColumnState, NumericTransformer};
