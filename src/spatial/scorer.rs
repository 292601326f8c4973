//! Spatial Scorer - raw model confidence over a grid
//!
//! Each grid point gets a synthesized reading derived from its offset to the
//! center, then goes through the model stack. Override rules are NOT applied:
//! the heatmap shows what the models think, not the rule-corrected decision.
//!
//! Points are scored in parallel with Rayon; output order equals input order.

use crate::data::{EnvironmentalReading, GridPoint, PipelineChoice, ScoredPoint};
use crate::error::{PredictionError, Result};
use crate::features::FeatureBuilder;
use crate::models::ModelStack;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deterministic stand-in reading for a grid point
pub fn synthesize_reading(point: GridPoint, center: GridPoint) -> EnvironmentalReading {
    let dlat = point.latitude - center.latitude;
    let dlon = point.longitude - center.longitude;
    EnvironmentalReading {
        sea_surface_temperature: 27.5 + 0.1 * dlat + 0.05 * dlon,
        salinity: 34.0 + 0.02 * dlat,
        dissolved_oxygen: 6.0 - 0.05 * dlat.abs(),
        historical_catch: 400.0 + 50.0 * point.latitude.to_radians().sin(),
    }
}

/// Bound on grid scoring work: optional deadline plus optional cancel flag
#[derive(Debug, Clone, Default)]
pub struct ScoringBudget {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl ScoringBudget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn check(&self, scored: usize, total: usize) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(PredictionError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(PredictionError::DeadlineExceeded { scored, total });
            }
        }
        Ok(())
    }
}

pub struct SpatialScorer {
    models: Arc<ModelStack>,
}

impl SpatialScorer {
    pub fn new(models: Arc<ModelStack>) -> Self {
        Self { models }
    }

    fn score_point(&self, point: GridPoint, center: GridPoint, choice: PipelineChoice) -> Result<ScoredPoint> {
        let reading = synthesize_reading(point, center);
        let (main, juvenile) = FeatureBuilder::build(&reading);
        let inference = self.models.infer(choice, &main, &juvenile)?;

        Ok(ScoredPoint {
            latitude: point.latitude,
            longitude: point.longitude,
            availability_probability: inference.availability_probability.clamp(0.0, 1.0),
            juvenile_probability: inference.juvenile_probability.clamp(0.0, 1.0),
            quantity_kg: inference.quantity_kg,
        })
    }

    /// Score every point; the first failure (model error or exhausted budget) aborts the grid
    pub fn score(
        &self,
        points: &[GridPoint],
        center: GridPoint,
        choice: PipelineChoice,
        budget: &ScoringBudget,
    ) -> Result<Vec<ScoredPoint>> {
        let total = points.len();
        let scored = AtomicUsize::new(0);

        let results = points
            .par_iter()
            .map(|&point| -> Result<ScoredPoint> {
                budget.check(scored.load(Ordering::Relaxed), total)?;
                let result = self.score_point(point, center, choice)?;
                scored.fetch_add(1, Ordering::Relaxed);
                Ok(result)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(points = total, pipeline = %choice, "grid scored");
        Ok(results)
    }
}
