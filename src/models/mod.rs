//! Model layer
//!
//! Trained models are opaque to the decision core; everything above this
//! module talks to them through three small traits:
//! - `Classifier`: hard label plus (optionally) class probabilities
//! - `Regressor`: scalar prediction
//! - `Reducer`: dimensionality-reduction transform
//!
//! Native evaluators for the exported artifacts live in `tree`, `pca` and
//! `voting`; `artifacts` loads them from disk, `confidence` turns raw outputs
//! into best-effort probabilities, and `stack` assembles the process-wide
//! `ModelStack`.

pub mod artifacts;
pub mod confidence;
pub mod pca;
pub mod stack;
pub mod tree;
pub mod voting;

pub use artifacts::{
    load_model_stack, parse_classifier, parse_reducer, parse_regressor, ClassifierArtifact, ReducerArtifact,
    RegressorArtifact,
};
pub use confidence::{availability_confidence, juvenile_confidence, AvailabilityConfidence, JuvenileConfidence};
pub use pca::PcaTransform;
pub use stack::{
    AvailabilityPipeline, DefaultPipeline, HybridPipeline, Inference, JuvenileModel, ModelStack,
    PipelineOutput,
};
pub use tree::{BoostedClassifier, BoostedRegressor, ForestClassifier, ForestRegressor};
pub use voting::{VotingClassifier, VotingMode, VotingRegressor};

use crate::error::{PredictionError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Reduced feature vector (inline for the widths these models use)
pub type FeatureVec = SmallVec<[f64; 4]>;

/// Class label as exported by the training side: integers for the
/// availability models, strings for the juvenile model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Text(String),
}

impl ClassLabel {
    /// Positive ("fish available") class
    pub fn is_positive(&self) -> bool {
        match self {
            ClassLabel::Int(v) => *v == 1,
            ClassLabel::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "yes" | "true"),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Int(v) => write!(f, "{}", v),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

pub trait Classifier: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Input width the model was fit on
    fn n_features(&self) -> usize;

    /// Class labels in probability-column order
    fn classes(&self) -> &[ClassLabel];

    fn predict(&self, features: &[f64]) -> Result<ClassLabel>;

    /// Whether `predict_proba` returns `Some`
    fn has_probabilities(&self) -> bool {
        false
    }

    /// Class probabilities aligned with `classes()`, when the model exposes them
    fn predict_proba(&self, _features: &[f64]) -> Result<Option<Vec<f64>>> {
        Ok(None)
    }
}

pub trait Regressor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn n_features(&self) -> usize;
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

pub trait Reducer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn n_features(&self) -> usize;
    fn n_components(&self) -> usize;
    fn transform(&self, features: &[f64]) -> Result<FeatureVec>;
}

/// Reject a feature vector whose width differs from the model's
pub(crate) fn check_shape(model: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PredictionError::FeatureShape {
            model: model.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Index of the largest value; first wins on ties
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_label_untagged() {
        let labels: Vec<ClassLabel> = serde_json::from_str(r#"[0, 1, "High"]"#).unwrap();
        assert_eq!(labels[0], ClassLabel::Int(0));
        assert!(labels[1].is_positive());
        assert_eq!(labels[2].to_string(), "High");
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_check_shape() {
        assert!(check_shape("m", 4, 4).is_ok());
        assert!(matches!(
            check_shape("m", 4, 3),
            Err(PredictionError::FeatureShape { expected: 4, actual: 3, .. })
        ));
    }
}
