//! Feature Builder
//!
//! Maps an `EnvironmentalReading` into the two fixed-shape vectors the models
//! were fit on. Column order is part of the model contract:
//! - availability / quantity: [SST, salinity, dissolved oxygen, historical catch]
//! - juvenile risk:           [SST, salinity, historical catch]

use crate::data::EnvironmentalReading;

pub const AVAILABILITY_FEATURE_COUNT: usize = 4;
pub const JUVENILE_FEATURE_COUNT: usize = 3;

pub const AVAILABILITY_FEATURE_NAMES: [&str; AVAILABILITY_FEATURE_COUNT] =
    ["SST", "Salinity", "Dissolved_Oxygen", "Historical_Catch"];
pub const JUVENILE_FEATURE_NAMES: [&str; JUVENILE_FEATURE_COUNT] =
    ["SST", "Salinity", "Historical_Catch"];

/// 4-field vector for the availability classifier and quantity regressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityFeatures(pub [f64; AVAILABILITY_FEATURE_COUNT]);

/// 3-field vector for the juvenile-risk classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JuvenileFeatures(pub [f64; JUVENILE_FEATURE_COUNT]);

impl AvailabilityFeatures {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl JuvenileFeatures {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn availability(reading: &EnvironmentalReading) -> AvailabilityFeatures {
        AvailabilityFeatures([
            reading.sea_surface_temperature,
            reading.salinity,
            reading.dissolved_oxygen,
            reading.historical_catch,
        ])
    }

    pub fn juvenile(reading: &EnvironmentalReading) -> JuvenileFeatures {
        JuvenileFeatures([
            reading.sea_surface_temperature,
            reading.salinity,
            reading.historical_catch,
        ])
    }

    /// Both vectors in one call
    pub fn build(reading: &EnvironmentalReading) -> (AvailabilityFeatures, JuvenileFeatures) {
        (Self::availability(reading), Self::juvenile(reading))
    }
}
