//! Seeded train/test split.

use crate::error::{GpaLearningError, Result};
use polars::prelude::*;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Shuffle `0..n_rows` with `seed` and hold out `ceil(test_size * n_rows)` rows.
    ///
    /// Both sides keep at least one row. The same inputs always produce the
    /// same partition.
    pub fn new(n_rows: usize, test_size: f64, seed: u64) -> Result<Self> {
        if n_rows < 2 {
            return Err(GpaLearningError::InvalidData(format!(
                "need at least 2 rows to split into train and test sets, got {}",
                n_rows
            )));
        }
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(GpaLearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = ((n_rows as f64 * test_size).ceil() as usize).clamp(1, n_rows - 1);
        let train = indices.split_off(n_test);

        Ok(Self {
            train,
            test: indices,
        })
    }
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        rows.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Split `df` into `(train, test)` frames.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame, SplitIndices)> {
    let split = SplitIndices::new(df.height(), test_size, seed)?;
    let train = take_rows(df, &split.train)?;
    let test = take_rows(df, &split.test)?;
    Ok((train, test, split))
}
