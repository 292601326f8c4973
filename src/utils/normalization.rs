//! Heatmap Normalization
//!
//! Converts one score dimension of a scored grid into [0, 1] intensities.
//!
//! - probabilities pass through, clamped to [0, 1]
//! - quantity is min-max rescaled with an epsilon guard:
//!   `(q - min) / (max - min + 1e-6)`, so an all-equal grid maps to 0

use crate::data::ScoredPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

const RANGE_EPSILON: f64 = 1e-6;

/// Score dimension painted onto the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeatDimension {
    #[default]
    #[serde(rename = "juvenile_probability", alias = "juvenile_risk_probability")]
    JuvenileProbability,

    #[serde(rename = "availability_probability", alias = "availability_prob")]
    AvailabilityProbability,

    #[serde(rename = "quantity", alias = "predicted_quantity")]
    Quantity,
}

impl fmt::Display for HeatDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeatDimension::JuvenileProbability => "juvenile_probability",
            HeatDimension::AvailabilityProbability => "availability_probability",
            HeatDimension::Quantity => "quantity",
        };
        f.write_str(name)
    }
}

impl HeatDimension {
    fn raw(&self, point: &ScoredPoint) -> f64 {
        match self {
            HeatDimension::JuvenileProbability => point.juvenile_probability,
            HeatDimension::AvailabilityProbability => point.availability_probability,
            HeatDimension::Quantity => point.quantity_kg,
        }
    }
}

pub struct HeatmapNormalizer;

impl HeatmapNormalizer {
    /// One intensity per point, in input order
    pub fn normalize(points: &[ScoredPoint], dimension: HeatDimension) -> Vec<f64> {
        let values: Vec<f64> = points.iter().map(|p| dimension.raw(p)).collect();
        match dimension {
            HeatDimension::Quantity => min_max(&values),
            _ => values.iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        }
    }
}

/// Min-max rescale with epsilon-guarded denominator
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min + RANGE_EPSILON;
    values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}
