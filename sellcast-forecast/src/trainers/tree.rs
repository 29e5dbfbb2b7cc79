//! Weighted CART regression tree, the building block of both boosters.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Tree growth limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root is depth 0)
    pub max_depth: usize,
    /// Minimum samples in each child of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a, F> {
    x: &'a Array2<f64>,
    targets: &'a [f64],
    weights: &'a [f64],
    params: TreeParams,
    leaf_value: F,
}

impl RegressionTree {
    /// Grow a tree on weighted squared error; leaves hold the weighted mean target.
    pub fn fit(x: &Array2<f64>, targets: &[f64], weights: &[f64], params: TreeParams) -> Self {
        Self::fit_with(x, targets, weights, params, |idx: &[usize]| {
            weighted_mean(targets, weights, idx)
        })
    }

    /// Grow a tree on weighted squared error, computing each leaf's value with `leaf_value`
    /// over the sample indices that reach it.
    pub fn fit_with<F>(
        x: &Array2<f64>,
        targets: &[f64],
        weights: &[f64],
        params: TreeParams,
        leaf_value: F,
    ) -> Self
    where
        F: Fn(&[usize]) -> f64,
    {
        let builder = Builder {
            x,
            targets,
            weights,
            params,
            leaf_value,
        };
        let indices: Vec<usize> = (0..x.nrows()).collect();
        Self {
            root: builder.build(indices, 0),
        }
    }

    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(v) => return *v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    #[cfg(test)]
    pub fn n_leaves(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Split { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn weighted_mean(targets: &[f64], weights: &[f64], idx: &[usize]) -> f64 {
    let sw: f64 = idx.iter().map(|&i| weights[i]).sum();
    if sw > 0.0 {
        idx.iter().map(|&i| weights[i] * targets[i]).sum::<f64>() / sw
    } else if idx.is_empty() {
        0.0
    } else {
        idx.iter().map(|&i| targets[i]).sum::<f64>() / idx.len() as f64
    }
}

/// Weighted sum of squared errors from (sum w, sum w*y, sum w*y^2).
fn sse(sw: f64, swy: f64, swy2: f64) -> f64 {
    if sw > 0.0 { swy2 - swy * swy / sw } else { 0.0 }
}

impl<F: Fn(&[usize]) -> f64> Builder<'_, F> {
    fn build(&self, indices: Vec<usize>, depth: usize) -> Node {
        let min_leaf = self.params.min_samples_leaf.max(1);
        if depth >= self.params.max_depth || indices.len() < 2 * min_leaf {
            return Node::Leaf((self.leaf_value)(&indices));
        }

        let Some(best) = self.best_split(&indices, min_leaf) else {
            return Node::Leaf((self.leaf_value)(&indices));
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[[i, best.feature]] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    fn best_split(&self, indices: &[usize], min_leaf: usize) -> Option<BestSplit> {
        let (mut sw, mut swy, mut swy2) = (0.0, 0.0, 0.0);
        for &i in indices {
            let (w, y) = (self.weights[i], self.targets[i]);
            sw += w;
            swy += w * y;
            swy2 += w * y * y;
        }
        let parent = sse(sw, swy, swy2);

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();
        for feature in 0..self.x.ncols() {
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let (mut lw, mut lwy, mut lwy2) = (0.0, 0.0, 0.0);
            for k in 0..sorted.len() - 1 {
                let i = sorted[k];
                let (w, y) = (self.weights[i], self.targets[i]);
                lw += w;
                lwy += w * y;
                lwy2 += w * y * y;

                let n_left = k + 1;
                if n_left < min_leaf || sorted.len() - n_left < min_leaf {
                    continue;
                }
                let here = self.x[[i, feature]];
                let next = self.x[[sorted[k + 1], feature]];
                if here >= next {
                    continue;
                }

                let gain = parent - sse(lw, lwy, lwy2) - sse(sw - lw, swy - lwy, swy2 - lwy2);
                if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}
