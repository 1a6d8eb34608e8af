//! Bagged ensemble of regression trees.

use super::tree::{RegressionTree, TreeParams};
use crate::config::ForestParams;
use crate::error::{GpaLearningError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Random forest regressor.
///
/// Tree `i` is grown with its own `ChaCha8Rng` seeded from
/// `random_seed + i`, so the fitted forest does not depend on how rayon
/// schedules the work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.params.random_seed = seed;
        self
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fit the forest to `x` and `y`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.params.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(GpaLearningError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(GpaLearningError::InvalidData(
                "cannot fit a forest on zero rows".to_string(),
            ));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(GpaLearningError::InvalidData(
                "target contains non-finite values".to_string(),
            ));
        }

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: self.params.max_features.resolve(n_features),
        };
        let base_seed = self.params.random_seed;
        let bootstrap = self.params.bootstrap;

        info!(
            "Growing {} trees on {} rows x {} features (max_features = {})",
            self.params.n_estimators, n_samples, n_features, tree_params.max_features
        );

        let grow = |tree_idx: usize| {
            let seed = base_seed.wrapping_add(tree_idx as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let samples: Vec<usize> = if bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            RegressionTree::fit(x.view(), y.view(), samples, &tree_params, &mut rng)
        };

        let n_trees = self.params.n_estimators;
        let trees: Vec<RegressionTree> = match self.params.n_jobs {
            1 => (0..n_trees).map(grow).collect(),
            -1 => (0..n_trees).into_par_iter().map(grow).collect(),
            jobs => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs as usize)
                    .build()
                    .map_err(|e| GpaLearningError::TrainingFailed(e.to_string()))?;
                pool.install(|| (0..n_trees).into_par_iter().map(grow).collect())
            }
        };

        self.trees = trees;
        self.n_features = n_features;
        self.compute_feature_importances();

        debug!(
            "Forest fitted: {} nodes in total",
            self.trees.iter().map(RegressionTree::n_nodes).sum::<usize>()
        );
        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, imp) in total.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }
        self.feature_importances = total;
    }

    /// Mean prediction over all trees, one value per row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(GpaLearningError::TrainingFailed(
                "forest has not been fitted".to_string(),
            ));
        }
        if x.ncols() != self.n_features {
            return Err(GpaLearningError::ShapeMismatch {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let n_trees = self.trees.len() as f64;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Normalized impurity decrease per feature (empty before fitting).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;
    use ndarray::array;

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 20,
            ..ForestParams::default()
        }
    }

    fn linear_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { 1.0 });
        let y = Array1::from_shape_fn(40, |i| 0.1 * i as f64);
        (x, y)
    }

    #[test]
    fn test_regressor_fits_linear_trend() {
        let (x, y) = linear_data();
        let mut forest = RandomForestRegressor::new(small_params());
        forest.fit(&x, &y).unwrap();

        let predictions = forest.predict(&x).unwrap();
        let mse = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 0.05, "MSE too high: {}", mse);
        assert_eq!(forest.n_trees(), 20);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = linear_data();
        let mut a = RandomForestRegressor::new(small_params());
        let mut b = RandomForestRegressor::new(ForestParams {
            n_jobs: 1,
            ..small_params()
        });
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_different_seed_different_forest() {
        let (x, y) = linear_data();
        let mut a = RandomForestRegressor::new(small_params());
        let mut b = RandomForestRegressor::new(small_params()).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_ne!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = linear_data();
        let mut forest = RandomForestRegressor::new(ForestParams {
            max_features: MaxFeatures::Sqrt,
            ..small_params()
        });
        forest.fit(&x, &y).unwrap();

        let importances = forest.feature_importances();
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // The second column is constant.
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_shape_errors() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let mut forest = RandomForestRegressor::new(small_params());
        assert!(matches!(
            forest.fit(&x, &array![1.0]),
            Err(GpaLearningError::ShapeMismatch { .. })
        ));

        forest.fit(&x, &array![1.0, 2.0]).unwrap();
        assert!(matches!(
            forest.predict(&array![[1.0, 2.0, 3.0]]),
            Err(GpaLearningError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let forest = RandomForestRegressor::new(small_params());
        assert!(!forest.is_fitted());
        assert!(forest.predict(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_explicit_thread_count() {
        let (x, y) = linear_data();
        let mut pooled = RandomForestRegressor::new(ForestParams {
            n_jobs: 2,
            ..small_params()
        });
        let mut global = RandomForestRegressor::new(small_params());
        pooled.fit(&x, &y).unwrap();
        global.fit(&x, &y).unwrap();
        assert_eq!(pooled.predict(&x).unwrap(), global.predict(&x).unwrap());
    }
}
