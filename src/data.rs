//! Core data model
//!
//! Readings, pipeline choice, juvenile risk levels, prediction results and
//! grid records. All of these are plain values: built once per request,
//! never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw environmental readings for one location at one time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Sea surface temperature (°C)
    pub sea_surface_temperature: f64,

    /// Salinity (PSU)
    pub salinity: f64,

    /// Dissolved oxygen (mg/L)
    pub dissolved_oxygen: f64,

    /// Previous average catch (kg)
    pub historical_catch: f64,
}

impl EnvironmentalReading {
    pub fn new(
        sea_surface_temperature: f64,
        salinity: f64,
        dissolved_oxygen: f64,
        historical_catch: f64,
    ) -> Self {
        Self {
            sea_surface_temperature,
            salinity,
            dissolved_oxygen,
            historical_catch,
        }
    }

    /// Reading used for a map click when no live per-point data is wired in
    pub fn map_click_default() -> Self {
        Self::new(28.0, 33.0, 6.2, 250.0)
    }
}

/// Which availability/quantity pipeline a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineChoice {
    /// Base classifier + regressor on the raw 4-field vector
    #[default]
    Default,

    /// Reducer + voting ensembles; only honoured when all three artifacts are loaded
    Hybrid,
}

impl fmt::Display for PipelineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineChoice::Default => write!(f, "default"),
            PipelineChoice::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Juvenile-density risk, ordered by severity (High > Medium > Low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JuvenileRisk {
    Low,
    Medium,
    High,
}

impl JuvenileRisk {
    /// Parse a classifier label ("Low" / "Medium" / "High", any case)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(JuvenileRisk::Low),
            "medium" => Some(JuvenileRisk::Medium),
            "high" => Some(JuvenileRisk::High),
            _ => None,
        }
    }

    /// Approximate severity score used when the classifier has no probabilities
    pub fn severity_score(&self) -> f64 {
        match self {
            JuvenileRisk::Low => 0.1,
            JuvenileRisk::Medium => 0.5,
            JuvenileRisk::High => 0.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JuvenileRisk::Low => "Low",
            JuvenileRisk::Medium => "Medium",
            JuvenileRisk::High => "High",
        }
    }
}

impl fmt::Display for JuvenileRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Override rule that changed a raw model decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    /// Condition score high enough and juvenile risk not High
    FavorableEnvironment,

    /// Location is a known major fishing hub
    KnownHub,
}

/// Final single-point recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub availability: bool,

    /// Expected catch (kg), never negative
    pub quantity_kg: f64,

    /// Straight from the juvenile classifier; no rule touches it
    pub juvenile_risk: JuvenileRisk,

    pub location_label: String,

    /// Number of favorable environmental bands (0-4)
    pub condition_score: u8,

    /// Rules that fired, in application order
    pub applied_rules: Vec<OverrideRule>,

    /// Pipeline that actually ran (Hybrid requests may fall back to Default)
    pub pipeline_used: PipelineChoice,
}

/// A lattice point (decimal degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GridPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Label used for map-click predictions
    pub fn location_label(&self) -> String {
        format!("Lat:{}, Lon:{}", self.latitude, self.longitude)
    }
}

/// Default map center (Kakinada coast)
pub const DEFAULT_MAP_CENTER: GridPoint = GridPoint {
    latitude: 16.9891,
    longitude: 82.2475,
};

/// Raw model confidence at one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub latitude: f64,
    pub longitude: f64,

    /// Probability of the positive availability class, in [0, 1]
    pub availability_probability: f64,

    /// Probability (or severity score) of High juvenile risk, in [0, 1]
    pub juvenile_probability: f64,

    /// Raw regressor output (kg)
    pub quantity_kg: f64,
}

impl ScoredPoint {
    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.latitude, self.longitude)
    }
}

// ============================================================================
// Region presets
// ============================================================================

/// Named coastal zone with a representative reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionPreset {
    pub name: &'static str,
    pub reading: EnvironmentalReading,
}

const fn preset(name: &'static str, sst: f64, salinity: f64, oxygen: f64, history: f64) -> RegionPreset {
    RegionPreset {
        name,
        reading: EnvironmentalReading {
            sea_surface_temperature: sst,
            salinity,
            dissolved_oxygen: oxygen,
            historical_catch: history,
        },
    }
}

pub const REGION_PRESETS: [RegionPreset; 5] = [
    preset("Vizag", 29.0, 33.0, 6.2, 300.0),
    preset("Kakinada", 28.0, 34.0, 6.5, 260.0),
    preset("Machilipatnam", 27.0, 32.0, 6.8, 210.0),
    preset("Goa", 30.0, 35.0, 5.7, 280.0),
    preset("Kochi", 29.0, 36.0, 6.0, 330.0),
];

/// Case-insensitive preset lookup
pub fn find_region(name: &str) -> Option<&'static RegionPreset> {
    let name = name.trim();
    REGION_PRESETS
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name))
}
