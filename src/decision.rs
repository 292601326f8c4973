//! Decision Engine - single-point recommendation
//!
//! Runs the model stack for one reading, then reconciles the three raw outputs
//! with two deterministic override rules:
//!
//! 1. Favorable environment: condition score >= 3 and juvenile risk != High
//!    forces availability and floors quantity at 200 kg.
//! 2. Known hub: a major fishing port with availability still false is forced
//!    available and floored at 220 kg.
//!
//! Rules only ever raise availability/quantity, and run in that order. Juvenile
//! risk is reported exactly as the classifier produced it.

use crate::data::{
    find_region, EnvironmentalReading, GridPoint, JuvenileRisk, OverrideRule, PipelineChoice,
    PredictionResult,
};
use crate::error::{PredictionError, Result};
use crate::features::FeatureBuilder;
use crate::models::{Inference, ModelStack};
use serde::Serialize;
use std::sync::Arc;

/// Inclusive band [min, max]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Thresholds and hub list used by the override rules
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRules {
    pub sst: Band,
    pub salinity: Band,
    pub dissolved_oxygen: Band,
    pub min_historical_catch: f64,

    /// Condition score needed for the favorable-environment rule
    pub min_condition_score: u8,
    pub favorable_quantity_floor: f64,

    pub hubs: Vec<String>,
    pub hub_quantity_floor: f64,
}

pub const MAJOR_FISHING_HUBS: [&str; 7] = ["Vizag", "Kakinada", "Chennai", "Goa", "Kochi", "Nellore", "Mangalore"];

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            sst: Band::new(22.0, 30.0),
            salinity: Band::new(30.0, 36.0),
            dissolved_oxygen: Band::new(5.0, 8.0),
            min_historical_catch: 150.0,
            min_condition_score: 3,
            favorable_quantity_floor: 200.0,
            hubs: MAJOR_FISHING_HUBS.iter().map(|h| h.to_string()).collect(),
            hub_quantity_floor: 220.0,
        }
    }
}

impl DecisionRules {
    /// Number of favorable bands (0-4), each checked independently
    pub fn condition_score(&self, reading: &EnvironmentalReading) -> u8 {
        [
            self.sst.contains(reading.sea_surface_temperature),
            self.salinity.contains(reading.salinity),
            self.dissolved_oxygen.contains(reading.dissolved_oxygen),
            reading.historical_catch >= self.min_historical_catch,
        ]
        .iter()
        .filter(|&&ok| ok)
        .count() as u8
    }

    /// Hub match ignores surrounding whitespace and ASCII case
    pub fn is_hub(&self, location_label: &str) -> bool {
        let label = location_label.trim();
        self.hubs.iter().any(|h| h.eq_ignore_ascii_case(label))
    }

    /// Apply both override rules to a raw inference
    pub fn apply(
        &self,
        reading: &EnvironmentalReading,
        inference: &Inference,
        location_label: &str,
    ) -> PredictionResult {
        let condition_score = self.condition_score(reading);
        let mut availability = inference.available;
        let mut quantity_kg = inference.quantity_kg;
        let mut applied_rules = Vec::new();

        if condition_score >= self.min_condition_score && inference.juvenile_risk != JuvenileRisk::High {
            availability = true;
            quantity_kg = quantity_kg.max(self.favorable_quantity_floor);
            applied_rules.push(OverrideRule::FavorableEnvironment);
        }

        if !availability && self.is_hub(location_label) {
            availability = true;
            quantity_kg = quantity_kg.max(self.hub_quantity_floor);
            applied_rules.push(OverrideRule::KnownHub);
        }

        PredictionResult {
            availability,
            quantity_kg: quantity_kg.max(0.0),
            juvenile_risk: inference.juvenile_risk,
            location_label: location_label.to_string(),
            condition_score,
            applied_rules,
            pipeline_used: inference.pipeline_used,
        }
    }
}

/// Prediction, or an explicit "unavailable" state carrying the diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Available(PredictionResult),
    Unavailable { reason: String },
}

pub struct DecisionEngine {
    models: Arc<ModelStack>,
    rules: DecisionRules,
}

impl DecisionEngine {
    pub fn new(models: Arc<ModelStack>) -> Self {
        Self::with_rules(models, DecisionRules::default())
    }

    pub fn with_rules(models: Arc<ModelStack>, rules: DecisionRules) -> Self {
        Self { models, rules }
    }

    pub fn rules(&self) -> &DecisionRules {
        &self.rules
    }

    pub fn models(&self) -> &Arc<ModelStack> {
        &self.models
    }

    /// Rule-corrected recommendation for one reading
    pub fn decide(
        &self,
        reading: &EnvironmentalReading,
        choice: PipelineChoice,
        location_label: &str,
    ) -> Result<PredictionResult> {
        let (main, juvenile) = FeatureBuilder::build(reading);
        let inference = self.models.infer(choice, &main, &juvenile)?;
        let result = self.rules.apply(reading, &inference, location_label);

        tracing::debug!(
            location = location_label,
            pipeline = %result.pipeline_used,
            raw_available = inference.available,
            available = result.availability,
            condition_score = result.condition_score,
            juvenile_risk = %result.juvenile_risk,
            "decision"
        );
        Ok(result)
    }

    /// `decide` with failures folded into `PredictionOutcome::Unavailable`
    pub fn predict(
        &self,
        reading: &EnvironmentalReading,
        choice: PipelineChoice,
        location_label: &str,
    ) -> PredictionOutcome {
        match self.decide(reading, choice, location_label) {
            Ok(result) => PredictionOutcome::Available(result),
            Err(e) => {
                tracing::error!(location = location_label, "prediction unavailable: {}", e);
                PredictionOutcome::Unavailable { reason: e.to_string() }
            }
        }
    }

    /// Decide for a named region preset, labelled with the preset name
    pub fn decide_region(&self, region: &str, choice: PipelineChoice) -> Result<PredictionResult> {
        let preset = find_region(region)
            .ok_or_else(|| PredictionError::InvalidRequest(format!("unknown region '{}'", region)))?;
        self.decide(&preset.reading, choice, preset.name)
    }

    /// Decide for a map click using the default reading and a coordinate label
    pub fn decide_map_click(&self, point: GridPoint, choice: PipelineChoice) -> Result<PredictionResult> {
        self.decide(&EnvironmentalReading::map_click_default(), choice, &point.location_label())
    }
}
