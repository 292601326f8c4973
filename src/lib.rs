//! Catch Scorer Rust Implementation
//!
//! Fish availability, catch quantity and juvenile-risk prediction for coastal
//! fishing zones, plus grid heatmaps and safe-zone ranking.
//!
//! Module layout:
//! - `data/`: readings, results, grid records, region presets
//! - `features/`: fixed-shape model input vectors
//! - `models/`: artifact evaluators, confidence adapters, the shared `ModelStack`
//! - `decision/`: single-point decision with override rules
//! - `spatial/`: grid sampling, parallel scoring, safe zones, heatmaps
//! - `utils/`: heatmap normalization
//! - `advice/`: user-facing recommendation
//! - `api_server/`: axum HTTP surface (feature `api`)

pub mod advice;
pub mod config;
pub mod data;
pub mod decision;
pub mod error;
pub mod features;
pub mod models;
pub mod spatial;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use advice::{advise, Advisory, Verdict};
pub use config::ServiceConfig;
pub use data::{
    EnvironmentalReading, GridPoint, JuvenileRisk, OverrideRule, PipelineChoice, PredictionResult,
    ScoredPoint, DEFAULT_MAP_CENTER, REGION_PRESETS,
};
pub use decision::{DecisionEngine, DecisionRules, PredictionOutcome};
pub use error::{PredictionError, Result};
pub use features::FeatureBuilder;
pub use models::ModelStack;
pub use spatial::{
    GridSampler, HeatmapReport, HeatmapRequest, HeatmapService, SafeZoneRanker, ScoringBudget, SpatialScorer,
};
pub use utils::{HeatDimension, HeatmapNormalizer};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
