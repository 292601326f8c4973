//! PCA projection for the hybrid pipeline
//!
//! `z = components · (x - mean)`, optionally divided by
//! `sqrt(explained_variance)` when the transform was fit with whitening.

use super::{check_shape, FeatureVec, Reducer};
use crate::error::{PredictionError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PcaTransform {
    #[serde(default)]
    pub name: String,
    pub mean: Vec<f64>,
    /// One row per component, each `mean.len()` wide
    pub components: Vec<Vec<f64>>,
    #[serde(default)]
    pub explained_variance: Option<Vec<f64>>,
    #[serde(default)]
    pub whiten: bool,
}

impl PcaTransform {
    pub fn validate(&self) -> Result<()> {
        let width = self.mean.len();
        if width == 0 {
            return Err(PredictionError::invalid_artifact(&self.name, "empty mean vector"));
        }
        if self.components.is_empty() {
            return Err(PredictionError::invalid_artifact(&self.name, "no components"));
        }
        if let Some(row) = self.components.iter().position(|c| c.len() != width) {
            return Err(PredictionError::invalid_artifact(
                &self.name,
                format!("component {} is not {} wide", row, width),
            ));
        }
        if self.whiten {
            match &self.explained_variance {
                Some(var) if var.len() == self.components.len() && var.iter().all(|v| *v > 0.0) => {}
                _ => {
                    return Err(PredictionError::invalid_artifact(
                        &self.name,
                        "whitening needs one positive explained variance per component",
                    ))
                }
            }
        }
        Ok(())
    }
}

impl Reducer for PcaTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn n_components(&self) -> usize {
        self.components.len()
    }

    fn transform(&self, features: &[f64]) -> Result<FeatureVec> {
        check_shape(&self.name, self.mean.len(), features.len())?;

        let mut out = FeatureVec::with_capacity(self.components.len());
        for (k, component) in self.components.iter().enumerate() {
            let mut z: f64 = component
                .iter()
                .zip(features.iter().zip(&self.mean))
                .map(|(w, (x, m))| w * (x - m))
                .sum();
            if self.whiten {
                if let Some(var) = &self.explained_variance {
                    z /= var[k].sqrt();
                }
            }
            out.push(z);
        }
        Ok(out)
    }
}
