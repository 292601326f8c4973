//! Shared utilities
//!
//! - Normalization: heatmap intensity rescaling

pub mod normalization;

pub use normalization::{min_max, HeatDimension, HeatmapNormalizer};
