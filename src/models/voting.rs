//! Voting ensembles (hybrid pipeline)
//!
//! Soft voting averages member probabilities; hard voting counts member labels
//! and, like sklearn, exposes no probabilities. The regressor is a weighted
//! mean of its members.

use super::{argmax, check_shape, ClassLabel, Classifier, Regressor};
use crate::error::{PredictionError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMode {
    #[default]
    Soft,
    Hard,
}

/// Equal weights when none are given; otherwise one non-negative weight per member
fn resolve_weights(model: &str, weights: Option<Vec<f64>>, n_members: usize) -> Result<Vec<f64>> {
    let weights = weights.unwrap_or_else(|| vec![1.0; n_members]);
    if weights.len() != n_members {
        return Err(PredictionError::invalid_artifact(
            model,
            format!("{} weights for {} members", weights.len(), n_members),
        ));
    }
    if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) || weights.iter().sum::<f64>() <= 0.0 {
        return Err(PredictionError::invalid_artifact(model, "weights must be non-negative with a positive sum"));
    }
    Ok(weights)
}

fn common_width(model: &str, mut widths: impl Iterator<Item = usize>) -> Result<usize> {
    let first = widths
        .next()
        .ok_or_else(|| PredictionError::invalid_artifact(model, "ensemble has no members"))?;
    if widths.any(|w| w != first) {
        return Err(PredictionError::invalid_artifact(model, "members disagree on input width"));
    }
    Ok(first)
}

#[derive(Debug)]
pub struct VotingClassifier {
    name: String,
    members: Vec<Box<dyn Classifier>>,
    weights: Vec<f64>,
    mode: VotingMode,
    classes: Vec<ClassLabel>,
    n_features: usize,
}

impl VotingClassifier {
    pub fn new(
        name: impl Into<String>,
        members: Vec<Box<dyn Classifier>>,
        weights: Option<Vec<f64>>,
        mode: VotingMode,
    ) -> Result<Self> {
        let name = name.into();
        let n_features = common_width(&name, members.iter().map(|m| m.n_features()))?;
        let weights = resolve_weights(&name, weights, members.len())?;

        let classes = members[0].classes().to_vec();
        if members.iter().any(|m| m.classes() != classes.as_slice()) {
            return Err(PredictionError::invalid_artifact(&name, "members disagree on class labels"));
        }
        if mode == VotingMode::Soft {
            if let Some(m) = members.iter().find(|m| !m.has_probabilities()) {
                return Err(PredictionError::invalid_artifact(
                    &name,
                    format!("soft voting member '{}' exposes no probabilities", m.name()),
                ));
            }
        }

        Ok(Self {
            name,
            members,
            weights,
            mode,
            classes,
            n_features,
        })
    }

    fn soft_probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        let mut acc = vec![0.0; self.classes.len()];
        for (member, weight) in self.members.iter().zip(&self.weights) {
            let probs = member.predict_proba(features)?.ok_or_else(|| {
                PredictionError::invalid_artifact(member.name(), "soft voting member returned no probabilities")
            })?;
            for (a, p) in acc.iter_mut().zip(probs) {
                *a += weight * p;
            }
        }
        let total: f64 = self.weights.iter().sum();
        acc.iter_mut().for_each(|a| *a /= total);
        Ok(acc)
    }

    fn hard_votes(&self, features: &[f64]) -> Result<Vec<f64>> {
        let mut votes = vec![0.0; self.classes.len()];
        for (member, weight) in self.members.iter().zip(&self.weights) {
            let label = member.predict(features)?;
            let idx = self
                .classes
                .iter()
                .position(|c| *c == label)
                .ok_or_else(|| PredictionError::UnknownLabel {
                    model: member.name().to_string(),
                    label: label.to_string(),
                })?;
            votes[idx] += weight;
        }
        Ok(votes)
    }
}

impl Classifier for VotingClassifier {
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
        let scores = match self.mode {
            VotingMode::Soft => self.soft_probabilities(features)?,
            VotingMode::Hard => self.hard_votes(features)?,
        };
        let idx = argmax(&scores).unwrap_or(0);
        Ok(self.classes[idx].clone())
    }

    fn has_probabilities(&self) -> bool {
        self.mode == VotingMode::Soft
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<Vec<f64>>> {
        check_shape(&self.name, self.n_features, features.len())?;
        match self.mode {
            VotingMode::Soft => self.soft_probabilities(features).map(Some),
            VotingMode::Hard => Ok(None),
        }
    }
}

#[derive(Debug)]
pub struct VotingRegressor {
    name: String,
    members: Vec<Box<dyn Regressor>>,
    weights: Vec<f64>,
    n_features: usize,
}

impl VotingRegressor {
    pub fn new(name: impl Into<String>, members: Vec<Box<dyn Regressor>>, weights: Option<Vec<f64>>) -> Result<Self> {
        let name = name.into();
        let n_features = common_width(&name, members.iter().map(|m| m.n_features()))?;
        let weights = resolve_weights(&name, weights, members.len())?;
        Ok(Self {
            name,
            members,
            weights,
            n_features,
        })
    }
}

impl Regressor for VotingRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_shape(&self.name, self.n_features, features.len())?;
        let mut sum = 0.0;
        for (member, weight) in self.members.iter().zip(&self.weights) {
            sum += weight * member.predict(features)?;
        }
        Ok(sum / self.weights.iter().sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tree::{ForestClassifier, ForestRegressor};
    use approx::assert_relative_eq;

    fn constant_forest(name: &str, probs: [f64; 2]) -> Box<dyn Classifier> {
        let json = format!(
            r#"{{"name": "{}", "n_features": 3, "classes": [0, 1],
                "trees": [{{"nodes": [{{"feature": -1, "value": [{}, {}]}}]}}]}}"#,
            name, probs[0], probs[1]
        );
        let forest: ForestClassifier = serde_json::from_str(&json).unwrap();
        Box::new(forest)
    }

    fn constant_regressor(value: f64) -> Box<dyn Regressor> {
        let json = format!(
            r#"{{"n_features": 3, "trees": [{{"nodes": [{{"feature": -1, "value": [{}]}}]}}]}}"#,
            value
        );
        let forest: ForestRegressor = serde_json::from_str(&json).unwrap();
        Box::new(forest)
    }

    #[test]
    fn test_soft_voting_weighted_average() {
        let clf = VotingClassifier::new(
            "hybrid",
            vec![constant_forest("rf", [0.2, 0.8]), constant_forest("gb", [0.6, 0.4])],
            Some(vec![3.0, 1.0]),
            VotingMode::Soft,
        )
        .unwrap();

        let probs = clf.predict_proba(&[0.0, 0.0, 0.0]).unwrap().unwrap();
        assert_relative_eq!(probs[1], 0.7, epsilon = 1e-9);
        assert_eq!(clf.predict(&[0.0, 0.0, 0.0]).unwrap(), ClassLabel::Int(1));
    }

    #[test]
    fn test_hard_voting_has_no_probabilities() {
        let clf = VotingClassifier::new(
            "hybrid",
            vec![
                constant_forest("a", [0.2, 0.8]),
                constant_forest("b", [0.6, 0.4]),
                constant_forest("c", [0.9, 0.1]),
            ],
            None,
            VotingMode::Hard,
        )
        .unwrap();

        assert!(!clf.has_probabilities());
        assert!(clf.predict_proba(&[0.0, 0.0, 0.0]).unwrap().is_none());
        assert_eq!(clf.predict(&[0.0, 0.0, 0.0]).unwrap(), ClassLabel::Int(0));
    }

    #[test]
    fn test_weight_count_mismatch() {
        let err = VotingClassifier::new(
            "hybrid",
            vec![constant_forest("a", [0.5, 0.5])],
            Some(vec![1.0, 1.0]),
            VotingMode::Soft,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 weights for 1 members"));
    }

    #[test]
    fn test_regressor_mean() {
        let reg = VotingRegressor::new("hybrid_q", vec![constant_regressor(100.0), constant_regressor(300.0)], None)
            .unwrap();
        assert_relative_eq!(reg.predict(&[1.0, 2.0, 3.0]).unwrap(), 200.0, epsilon = 1e-9);
        assert!(reg.predict(&[1.0, 2.0]).is_err());
    }
}
