//! Spatial analysis: grid sampling, parallel scoring, safe zones, heatmaps

pub mod grid;
pub mod heatmap;
pub mod safe_zones;
pub mod scorer;

pub use grid::GridSampler;
pub use heatmap::{
    GridStatus, HeatPoint, HeatmapReport, HeatmapRequest, HeatmapService, RADIUS_KM_RANGE, RESOLUTION_RANGE,
};
pub use safe_zones::{SafeZoneCriteria, SafeZoneRanker};
pub use scorer::{synthesize_reading, ScoringBudget, SpatialScorer};
