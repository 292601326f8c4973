//! Tree ensembles exported from sklearn
//!
//! Node layout follows the sklearn export:
//!
//! ```json
//! { "feature": 2, "threshold": 6.1, "left": 1, "right": 4, "value": null }
//! { "feature": -1, "threshold": 0.0, "left": -1, "right": -1, "value": [12.0, 3.0] }
//! ```
//!
//! Traversal starts at node 0. `x[feature] <= threshold` (or NaN) goes left,
//! anything else goes right, until a leaf (`feature == -1`) is reached.
//!
//! - Random forest classifier: leaf values are class counts or fractions;
//!   each tree's leaf is normalized and the forest averages them.
//! - Random forest regressor: mean of single-value leaves.
//! - Gradient boosting: `init + learning_rate * sum(tree)`; the binary
//!   classifier passes that log-odds through a sigmoid.

use super::{argmax, check_shape, ClassLabel, Classifier, Regressor};
use crate::error::{PredictionError, Result};
use serde::Deserialize;

/// A single node in a decision tree.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    /// Feature index to split on (-1 for leaf nodes)
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default = "no_child")]
    pub left: i32,
    #[serde(default = "no_child")]
    pub right: i32,
    /// Leaf payload (None for internal nodes)
    #[serde(default)]
    pub value: Option<Vec<f64>>,
}

fn no_child() -> i32 {
    -1
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check child links, split features and leaf widths
    fn validate(&self, model: &str, n_features: usize, leaf_width: usize) -> Result<()> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(PredictionError::invalid_artifact(model, "tree has no nodes"));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.feature == -1 {
                match &node.value {
                    Some(v) if v.len() == leaf_width => {}
                    Some(v) => {
                        return Err(PredictionError::invalid_artifact(
                            model,
                            format!("leaf {} has {} values, expected {}", i, v.len(), leaf_width),
                        ))
                    }
                    None => {
                        return Err(PredictionError::invalid_artifact(
                            model,
                            format!("leaf {} missing value array", i),
                        ))
                    }
                }
                continue;
            }

            if node.feature < 0 || node.feature as usize >= n_features {
                return Err(PredictionError::invalid_artifact(
                    model,
                    format!("node {} splits on invalid feature {}", i, node.feature),
                ));
            }
            // Children must point forward; rules out cycles in pre-order exports
            for child in [node.left, node.right] {
                if child <= i as i32 || child as usize >= n_nodes {
                    return Err(PredictionError::invalid_artifact(
                        model,
                        format!("node {} has invalid child {}", i, child),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Leaf payload for the given features
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.feature == -1 {
                return node.value.as_deref().unwrap_or(&[]);
            }
            let x = features
                .get(node.feature as usize)
                .copied()
                .unwrap_or(f64::NAN);
            idx = if x.is_nan() || x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn validate_common(model: &str, n_features: usize, trees: &[DecisionTree]) -> Result<()> {
    if n_features == 0 {
        return Err(PredictionError::invalid_artifact(model, "n_features must be positive"));
    }
    if trees.is_empty() {
        return Err(PredictionError::invalid_artifact(model, "ensemble has no trees"));
    }
    Ok(())
}

// ============================================================================
// Random forest
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ForestClassifier {
    #[serde(default)]
    pub name: String,
    pub n_features: usize,
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.name, self.n_features, &self.trees)?;
        if self.classes.len() < 2 {
            return Err(PredictionError::invalid_artifact(&self.name, "need at least two classes"));
        }
        for tree in &self.trees {
            tree.validate(&self.name, self.n_features, self.classes.len())?;
        }
        Ok(())
    }

    fn probabilities(&self, features: &[f64]) -> Vec<f64> {
        let n_classes = self.classes.len();
        let mut acc = vec![0.0; n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf(features);
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (a, v) in acc.iter_mut().zip(leaf) {
                    *a += v / total;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n_trees);
        acc
    }
}

impl Classifier for ForestClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict(&self, features: &[f64]) -> Result<ClassLabel> {
        check_shape(&self.name, self.n_features, features.len())?;
        let probs = self.probabilities(features);
        let idx = argmax(&probs).unwrap_or(0);
        Ok(self.classes[idx].clone())
    }

    fn has_probabilities(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<Vec<f64>>> {
        check_shape(&self.name, self.n_features, features.len())?;
        Ok(Some(self.probabilities(features)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForestRegressor {
    #[serde(default)]
    pub name: String,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.name, self.n_features, &self.trees)?;
        for tree in &self.trees {
            tree.validate(&self.name, self.n_features, 1)?;
        }
        Ok(())
    }
}

impl Regressor for ForestRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_shape(&self.name, self.n_features, features.len())?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf(features)[0]).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

// ============================================================================
// Gradient boosting
// ============================================================================

fn boosted_raw(init: f64, learning_rate: f64, trees: &[DecisionTree], features: &[f64]) -> f64 {
    init + learning_rate * trees.iter().map(|t| t.leaf(features)[0]).sum::<f64>()
}

/// Binary gradient-boosted classifier (log-loss)
#[derive(Debug, Clone, Deserialize)]
pub struct BoostedClassifier {
    #[serde(default)]
    pub name: String,
    pub n_features: usize,
    /// [negative, positive]
    pub classes: Vec<ClassLabel>,
    /// Prior log-odds
    #[serde(default)]
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTree>,
}

impl BoostedClassifier {
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.name, self.n_features, &self.trees)?;
        if self.classes.len() != 2 {
            return Err(PredictionError::invalid_artifact(
                &self.name,
                format!("gradient boosting supports 2 classes, got {}", self.classes.len()),
            ));
        }
        for tree in &self.trees {
            tree.validate(&self.name, self.n_features, 1)?;
        }
        Ok(())
    }

    fn positive_probability(&self, features: &[f64]) -> f64 {
        sigmoid(boosted_raw(self.init, self.learning_rate, &self.trees, features))
    }
}

impl Classifier for BoostedClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict(&self, features: &[f64]) -> Result<ClassLabel> {
        check_shape(&self.name, self.n_features, features.len())?;
        let idx = if self.positive_probability(features) > 0.5 { 1 } else { 0 };
        Ok(self.classes[idx].clone())
    }

    fn has_probabilities(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<Vec<f64>>> {
        check_shape(&self.name, self.n_features, features.len())?;
        let p = self.positive_probability(features);
        Ok(Some(vec![1.0 - p, p]))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoostedRegressor {
    #[serde(default)]
    pub name: String,
    pub n_features: usize,
    #[serde(default)]
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTree>,
}

impl BoostedRegressor {
    pub fn validate(&self) -> Result<()> {
        validate_common(&self.name, self.n_features, &self.trees)?;
        for tree in &self.trees {
            tree.validate(&self.name, self.n_features, 1)?;
        }
        Ok(())
    }
}

impl Regressor for BoostedRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_shape(&self.name, self.n_features, features.len())?;
        Ok(boosted_raw(self.init, self.learning_rate, &self.trees, features))
    }
}
