//! Random forest regression.

mod random_forest;
mod tree;

pub use random_forest::RandomForestRegressor;
pub use tree::{Node, RegressionTree, TreeParams};
