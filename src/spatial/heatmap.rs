//! Heatmap Service - one grid request end to end
//!
//! validate -> sample -> score (within budget) -> normalize -> rank

use super::grid::GridSampler;
use super::safe_zones::SafeZoneRanker;
use super::scorer::{ScoringBudget, SpatialScorer};
use crate::data::{GridPoint, PipelineChoice, ScoredPoint, DEFAULT_MAP_CENTER};
use crate::error::{PredictionError, Result};
use crate::models::ModelStack;
use crate::utils::{HeatDimension, HeatmapNormalizer};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

pub const RADIUS_KM_RANGE: RangeInclusive<f64> = 5.0..=100.0;
pub const RESOLUTION_RANGE: RangeInclusive<usize> = 10..=80;

fn default_center() -> GridPoint {
    DEFAULT_MAP_CENTER
}

fn default_radius() -> f64 {
    25.0
}

fn default_resolution() -> usize {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRequest {
    #[serde(default = "default_center")]
    pub center: GridPoint,
    #[serde(default = "default_radius")]
    pub radius_km: f64,
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    #[serde(default)]
    pub dimension: HeatDimension,
    #[serde(default)]
    pub pipeline: PipelineChoice,
}

impl Default for HeatmapRequest {
    fn default() -> Self {
        Self {
            center: default_center(),
            radius_km: default_radius(),
            resolution: default_resolution(),
            dimension: HeatDimension::default(),
            pipeline: PipelineChoice::default(),
        }
    }
}

impl HeatmapRequest {
    pub fn validate(&self) -> Result<()> {
        if !RADIUS_KM_RANGE.contains(&self.radius_km) {
            return Err(PredictionError::InvalidRequest(format!(
                "radius_km must be within {}-{} km, got {}",
                RADIUS_KM_RANGE.start(),
                RADIUS_KM_RANGE.end(),
                self.radius_km
            )));
        }
        if !RESOLUTION_RANGE.contains(&self.resolution) {
            return Err(PredictionError::InvalidRequest(format!(
                "resolution must be within {}-{}, got {}",
                RESOLUTION_RANGE.start(),
                RESOLUTION_RANGE.end(),
                self.resolution
            )));
        }
        let GridPoint { latitude, longitude } = self.center;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(PredictionError::InvalidRequest(format!(
                "center ({}, {}) is not a valid coordinate",
                latitude, longitude
            )));
        }
        Ok(())
    }

    /// Stable key for response caching
    pub fn cache_key(&self) -> String {
        format!(
            "{:.6},{:.6}|{}|{}|{}|{}",
            self.center.latitude,
            self.center.longitude,
            self.radius_km,
            self.resolution,
            self.dimension,
            self.pipeline
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStatus {
    Scored,
    NoScoreablePoints,
}

/// Point plus its normalized intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapReport {
    pub status: GridStatus,
    pub dimension: HeatDimension,
    pub pipeline_used: PipelineChoice,
    pub intensities: Vec<HeatPoint>,
    pub safe_zones: Vec<ScoredPoint>,
    /// Raw score table, grid order
    pub points: Vec<ScoredPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HeatmapReport {
    fn unscoreable(dimension: HeatDimension, pipeline_used: PipelineChoice, reason: String) -> Self {
        Self {
            status: GridStatus::NoScoreablePoints,
            dimension,
            pipeline_used,
            intensities: Vec::new(),
            safe_zones: Vec::new(),
            points: Vec::new(),
            reason: Some(reason),
        }
    }
}

pub struct HeatmapService {
    models: Arc<ModelStack>,
    scorer: SpatialScorer,
    ranker: SafeZoneRanker,
    deadline: Option<Duration>,
}

impl HeatmapService {
    pub fn new(models: Arc<ModelStack>) -> Self {
        Self {
            scorer: SpatialScorer::new(Arc::clone(&models)),
            models,
            ranker: SafeZoneRanker::default(),
            deadline: None,
        }
    }

    /// Per-request scoring deadline (None = unbounded)
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_ranker(mut self, ranker: SafeZoneRanker) -> Self {
        self.ranker = ranker;
        self
    }

    fn budget(&self) -> ScoringBudget {
        match self.deadline {
            Some(d) => ScoringBudget::with_timeout(d),
            None => ScoringBudget::unbounded(),
        }
    }

    pub fn generate(&self, request: &HeatmapRequest) -> Result<HeatmapReport> {
        self.generate_with_budget(request, self.budget())
    }

    /// Model failures become a `NoScoreablePoints` report; validation and
    /// budget failures are returned as errors.
    pub fn generate_with_budget(&self, request: &HeatmapRequest, budget: ScoringBudget) -> Result<HeatmapReport> {
        request.validate()?;
        let pipeline_used = self.models.pipeline(request.pipeline).choice();

        let grid = GridSampler::generate(request.center, request.radius_km, request.resolution);
        let points = match self.scorer.score(&grid, request.center, request.pipeline, &budget) {
            Ok(points) => points,
            Err(e @ (PredictionError::DeadlineExceeded { .. } | PredictionError::Cancelled)) => return Err(e),
            Err(e) => {
                tracing::error!("Grid scoring failed: {}", e);
                return Ok(HeatmapReport::unscoreable(request.dimension, pipeline_used, e.to_string()));
            }
        };

        let intensities = HeatmapNormalizer::normalize(&points, request.dimension)
            .into_iter()
            .zip(&points)
            .map(|(intensity, p)| HeatPoint {
                latitude: p.latitude,
                longitude: p.longitude,
                intensity,
            })
            .collect();
        let safe_zones = self.ranker.rank(&points);

        tracing::info!(
            "Heatmap: {} points, {} safe zones ({}, {})",
            points.len(),
            safe_zones.len(),
            request.dimension,
            pipeline_used
        );

        Ok(HeatmapReport {
            status: GridStatus::Scored,
            dimension: request.dimension,
            pipeline_used,
            intensities,
            safe_zones,
            points,
            reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(HeatmapRequest::default().validate().is_ok());

        let too_small = HeatmapRequest { radius_km: 4.9, ..Default::default() };
        assert!(matches!(too_small.validate(), Err(PredictionError::InvalidRequest(_))));

        let too_fine = HeatmapRequest { resolution: 81, ..Default::default() };
        assert!(too_fine.validate().is_err());

        let edges = HeatmapRequest { radius_km: 100.0, resolution: 10, ..Default::default() };
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: HeatmapRequest = serde_json::from_str(r#"{"dimension": "predicted_quantity"}"#).unwrap();
        assert_eq!(req.center, DEFAULT_MAP_CENTER);
        assert_eq!(req.dimension, HeatDimension::Quantity);
        assert_eq!(req.pipeline, PipelineChoice::Default);
    }

    #[test]
    fn test_cache_key_distinguishes_dimension() {
        let a = HeatmapRequest::default();
        let b = HeatmapRequest { dimension: HeatDimension::Quantity, ..Default::default() };
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
