//! Best-effort confidence adapters
//!
//! Not every trained variant exposes calibrated probabilities (hard-voting
//! ensembles never do). These adapters are the one place that decides what
//! number to report:
//!
//! - availability: probability of the positive class, else the hard label as 0/1
//! - juvenile risk: probability of the "High" class, else the label's severity
//!   score (Low 0.1, Medium 0.5, High 0.9)
//!
//! Probability columns are located by class label, never by position.

use super::{ClassLabel, Classifier};
use crate::data::JuvenileRisk;
use crate::error::{PredictionError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityConfidence {
    /// Hard label from the classifier
    pub available: bool,

    /// Positive-class probability in [0, 1]
    pub probability: f64,

    /// False when `probability` is the coerced hard label
    pub calibrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JuvenileConfidence {
    pub risk: JuvenileRisk,

    /// Probability (or severity score) of High risk, in [0, 1]
    pub probability: f64,

    pub calibrated: bool,
}

fn probability_column(classifier: &dyn Classifier, probs: &[f64], idx: usize) -> Result<f64> {
    if probs.len() != classifier.classes().len() {
        return Err(PredictionError::invalid_artifact(
            classifier.name(),
            format!(
                "{} probabilities for {} classes",
                probs.len(),
                classifier.classes().len()
            ),
        ));
    }
    Ok(probs[idx].clamp(0.0, 1.0))
}

pub fn availability_confidence(classifier: &dyn Classifier, features: &[f64]) -> Result<AvailabilityConfidence> {
    let available = classifier.predict(features)?.is_positive();
    let fallback = AvailabilityConfidence {
        available,
        probability: if available { 1.0 } else { 0.0 },
        calibrated: false,
    };

    let Some(probs) = classifier.predict_proba(features)? else {
        return Ok(fallback);
    };

    let Some(idx) = classifier.classes().iter().position(ClassLabel::is_positive) else {
        tracing::warn!(
            model = classifier.name(),
            "classifier exposes probabilities but no positive class; using hard label"
        );
        return Ok(fallback);
    };

    Ok(AvailabilityConfidence {
        available,
        probability: probability_column(classifier, &probs, idx)?,
        calibrated: true,
    })
}

/// Risk label the classifier emits, bound to the `JuvenileRisk` enum
pub fn juvenile_label(classifier: &dyn Classifier, features: &[f64]) -> Result<JuvenileRisk> {
    let label = classifier.predict(features)?;
    match &label {
        ClassLabel::Text(s) => JuvenileRisk::from_label(s),
        ClassLabel::Int(_) => None,
    }
    .ok_or_else(|| PredictionError::UnknownLabel {
        model: classifier.name().to_string(),
        label: label.to_string(),
    })
}

/// Column holding P(High), if the classifier has one
pub fn high_risk_column(classifier: &dyn Classifier) -> Option<usize> {
    classifier.classes().iter().position(|c| match c {
        ClassLabel::Text(s) => JuvenileRisk::from_label(s) == Some(JuvenileRisk::High),
        ClassLabel::Int(_) => false,
    })
}

pub fn juvenile_confidence(classifier: &dyn Classifier, features: &[f64]) -> Result<JuvenileConfidence> {
    let risk = juvenile_label(classifier, features)?;
    let fallback = JuvenileConfidence {
        risk,
        probability: risk.severity_score(),
        calibrated: false,
    };

    let Some(probs) = classifier.predict_proba(features)? else {
        return Ok(fallback);
    };

    let Some(idx) = high_risk_column(classifier) else {
        tracing::warn!(
            model = classifier.name(),
            "juvenile classifier has no 'High' class; using label severity score"
        );
        return Ok(fallback);
    };

    Ok(JuvenileConfidence {
        risk,
        probability: probability_column(classifier, &probs, idx)?,
        calibrated: true,
    })
}
