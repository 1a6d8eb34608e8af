//! Regression tree grown with the squared-error criterion.
//!
//! Nodes live in a flat arena indexed from the root at 0, so fitting,
//! prediction and serialization never recurse.

use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

/// Minimum gap between adjacent sorted feature values for a split between them.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Minimum SSE decrease for a split to be kept.
const MIN_GAIN: f64 = 1e-12;

/// Tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per node, already resolved against the matrix width.
    pub max_features: usize,
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
    /// Total SSE decrease per feature, normalized to sum to 1 (all zeros for a stump).
    feature_importances: Vec<f64>,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    child_sse: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` listed in `samples` (repeats allowed).
    pub fn fit<R: Rng + ?Sized>(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.ncols();
        let mut nodes = vec![Node::Leaf {
            value: 0.0,
            n_samples: 0,
        }];
        let mut importances = vec![0.0; n_features];
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let n = samples.len();
            let mean = if n == 0 {
                0.0
            } else {
                samples.iter().map(|&i| y[i]).sum::<f64>() / n as f64
            };
            let sse: f64 = samples.iter().map(|&i| (y[i] - mean).powi(2)).sum();
            nodes[node] = Node::Leaf {
                value: mean,
                n_samples: n,
            };

            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
            if depth_reached
                || n < params.min_samples_split
                || n < 2 * params.min_samples_leaf
                || sse <= MIN_GAIN
                || n_features == 0
            {
                continue;
            }

            let Some(best) = find_best_split(x, y, &samples, params, rng) else {
                continue;
            };
            let gain = sse - best.child_sse;
            if gain <= MIN_GAIN {
                continue;
            }

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&i| x[[i, best.feature]] <= best.threshold);

            importances[best.feature] += gain;

            let left = nodes.len();
            let right = left + 1;
            let placeholder = Node::Leaf {
                value: mean,
                n_samples: 0,
            };
            nodes.push(placeholder.clone());
            nodes.push(placeholder);
            nodes[node] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
                n_samples: n,
            };

            stack.push(Pending {
                node: right,
                samples: right_samples,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self {
            nodes,
            n_features,
            feature_importances: importances,
        }
    }

    /// Predict a single feature row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[idx] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }
}

/// Scan up to `max_features` non-constant features, in random order, for the
/// split with the lowest child SSE.
fn find_best_split<R: Rng + ?Sized>(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    samples: &[usize],
    params: &TreeParams,
    rng: &mut R,
) -> Option<BestSplit> {
    let n = samples.len();
    let n_features = x.ncols();
    let k = params.max_features.clamp(1, n_features);
    let min_leaf = params.min_samples_leaf;

    let total_sum: f64 = samples.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();

    let mut best: Option<BestSplit> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

    // Constant features do not count towards the `k` features visited.
    let mut visited = 0;
    for feature in sample(rng, n_features, n_features).into_iter() {
        if visited == k {
            break;
        }

        pairs.clear();
        pairs.extend(samples.iter().map(|&i| (x[[i, feature]], y[i])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        if pairs[n - 1].0 - pairs[0].0 <= FEATURE_THRESHOLD {
            continue;
        }
        visited += 1;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 1..n {
            let (prev_x, prev_y) = pairs[i - 1];
            left_sum += prev_y;
            left_sq += prev_y * prev_y;

            if i < min_leaf || n - i < min_leaf {
                continue;
            }
            let next_x = pairs[i].0;
            if next_x - prev_x <= FEATURE_THRESHOLD {
                continue;
            }

            let n_left = i as f64;
            let n_right = (n - i) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let left_sse = (left_sq - left_sum * left_sum / n_left).max(0.0);
            let right_sse = (right_sq - right_sum * right_sum / n_right).max(0.0);
            let child_sse = left_sse + right_sse;

            if best.as_ref().is_none_or(|b| child_sse < b.child_sse) {
                let mut threshold = (prev_x + next_x) / 2.0;
                if threshold >= next_x {
                    threshold = prev_x;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    child_sse,
                });
            }
        }
    }

    best
}
