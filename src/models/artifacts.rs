//! Model artifact loading
//!
//! Artifacts are JSON exports tagged by `model_type`, one file per model:
//!
//! | file                               | role       | required |
//! |------------------------------------|------------|----------|
//! | `availability_model.json`          | classifier | yes      |
//! | `quantity_model.json`              | regressor  | yes      |
//! | `juvenile_model.json`              | classifier | yes      |
//! | `pca_transform.json`               | reducer    | hybrid   |
//! | `hybrid_availability_model.json`   | classifier | hybrid   |
//! | `hybrid_quantity_model.json`       | regressor  | hybrid   |
//!
//! A missing or broken required artifact aborts loading. The hybrid set is
//! all-or-nothing: if any part is missing or unusable the stack is built
//! without it and the Default pipeline serves every request.

use super::pca::PcaTransform;
use super::stack::{DefaultPipeline, HybridPipeline, JuvenileModel, ModelStack};
use super::tree::{BoostedClassifier, BoostedRegressor, ForestClassifier, ForestRegressor};
use super::voting::{VotingClassifier, VotingMode, VotingRegressor};
use super::{Classifier, Reducer, Regressor};
use crate::error::{PredictionError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const AVAILABILITY_MODEL_FILE: &str = "availability_model.json";
pub const QUANTITY_MODEL_FILE: &str = "quantity_model.json";
pub const JUVENILE_MODEL_FILE: &str = "juvenile_model.json";
pub const PCA_TRANSFORM_FILE: &str = "pca_transform.json";
pub const HYBRID_AVAILABILITY_MODEL_FILE: &str = "hybrid_availability_model.json";
pub const HYBRID_QUANTITY_MODEL_FILE: &str = "hybrid_quantity_model.json";

#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(ForestClassifier),
    GradientBoosting(BoostedClassifier),
    Voting {
        #[serde(default)]
        name: String,
        estimators: Vec<ClassifierArtifact>,
        #[serde(default)]
        weights: Option<Vec<f64>>,
        #[serde(default)]
        voting: VotingMode,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum RegressorArtifact {
    RandomForest(ForestRegressor),
    GradientBoosting(BoostedRegressor),
    Voting {
        #[serde(default)]
        name: String,
        estimators: Vec<RegressorArtifact>,
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ReducerArtifact {
    Pca(PcaTransform),
}

fn name_or(name: String, fallback: &str) -> String {
    if name.is_empty() {
        fallback.to_string()
    } else {
        name
    }
}

impl ClassifierArtifact {
    /// Validate and turn into a model; `fallback_name` is used when the export carries no name
    pub fn into_classifier(self, fallback_name: &str) -> Result<Box<dyn Classifier>> {
        match self {
            ClassifierArtifact::RandomForest(mut model) => {
                model.name = name_or(model.name, fallback_name);
                model.validate()?;
                Ok(Box::new(model))
            }
            ClassifierArtifact::GradientBoosting(mut model) => {
                model.name = name_or(model.name, fallback_name);
                model.validate()?;
                Ok(Box::new(model))
            }
            ClassifierArtifact::Voting {
                name,
                estimators,
                weights,
                voting,
            } => {
                let name = name_or(name, fallback_name);
                let members = estimators
                    .into_iter()
                    .enumerate()
                    .map(|(i, e)| e.into_classifier(&format!("{}[{}]", name, i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(VotingClassifier::new(name, members, weights, voting)?))
            }
        }
    }
}

impl RegressorArtifact {
    pub fn into_regressor(self, fallback_name: &str) -> Result<Box<dyn Regressor>> {
        match self {
            RegressorArtifact::RandomForest(mut model) => {
                model.name = name_or(model.name, fallback_name);
                model.validate()?;
                Ok(Box::new(model))
            }
            RegressorArtifact::GradientBoosting(mut model) => {
                model.name = name_or(model.name, fallback_name);
                model.validate()?;
                Ok(Box::new(model))
            }
            RegressorArtifact::Voting {
                name,
                estimators,
                weights,
            } => {
                let name = name_or(name, fallback_name);
                let members = estimators
                    .into_iter()
                    .enumerate()
                    .map(|(i, e)| e.into_regressor(&format!("{}[{}]", name, i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(VotingRegressor::new(name, members, weights)?))
            }
        }
    }
}

impl ReducerArtifact {
    pub fn into_reducer(self, fallback_name: &str) -> Result<Box<dyn Reducer>> {
        match self {
            ReducerArtifact::Pca(mut model) => {
                model.name = name_or(model.name, fallback_name);
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_str<T: DeserializeOwned>(json: &str, name: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| PredictionError::invalid_artifact(name, e.to_string()))
}

/// Parse an in-memory classifier export
pub fn parse_classifier(json: &str, name: &str) -> Result<Box<dyn Classifier>> {
    parse_str::<ClassifierArtifact>(json, name)?.into_classifier(name)
}

pub fn parse_regressor(json: &str, name: &str) -> Result<Box<dyn Regressor>> {
    parse_str::<RegressorArtifact>(json, name)?.into_regressor(name)
}

pub fn parse_reducer(json: &str, name: &str) -> Result<Box<dyn Reducer>> {
    parse_str::<ReducerArtifact>(json, name)?.into_reducer(name)
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| PredictionError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| PredictionError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}

pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>> {
    read_artifact::<ClassifierArtifact>(path)?.into_classifier(&file_stem(path))
}

pub fn load_regressor(path: &Path) -> Result<Box<dyn Regressor>> {
    read_artifact::<RegressorArtifact>(path)?.into_regressor(&file_stem(path))
}

pub fn load_reducer(path: &Path) -> Result<Box<dyn Reducer>> {
    read_artifact::<ReducerArtifact>(path)?.into_reducer(&file_stem(path))
}

// ============================================================================
// Stack loading
// ============================================================================

fn require(dir: &Path, file: &str, model: &'static str) -> Result<PathBuf> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(PredictionError::MissingModel { model, path });
    }
    Ok(path)
}

/// Hybrid set, or None when none of its files exist
fn load_hybrid(dir: &Path) -> Result<Option<HybridPipeline>> {
    let files = [PCA_TRANSFORM_FILE, HYBRID_AVAILABILITY_MODEL_FILE, HYBRID_QUANTITY_MODEL_FILE];
    if files.iter().all(|f| !dir.join(f).exists()) {
        return Ok(None);
    }

    let reducer = load_reducer(&require(dir, PCA_TRANSFORM_FILE, "pca_transform")?)?;
    let classifier = load_classifier(&require(dir, HYBRID_AVAILABILITY_MODEL_FILE, "hybrid_availability")?)?;
    let regressor = load_regressor(&require(dir, HYBRID_QUANTITY_MODEL_FILE, "hybrid_quantity")?)?;
    HybridPipeline::new(reducer, classifier, regressor).map(Some)
}

/// Load the full stack from a models directory
pub fn load_model_stack(dir: &Path) -> Result<ModelStack> {
    tracing::info!("Loading model artifacts from {:?}", dir);

    let classifier = load_classifier(&require(dir, AVAILABILITY_MODEL_FILE, "availability")?)?;
    let regressor = load_regressor(&require(dir, QUANTITY_MODEL_FILE, "quantity")?)?;
    let default = DefaultPipeline::new(classifier, regressor)?;

    let juvenile = JuvenileModel::new(load_classifier(&require(dir, JUVENILE_MODEL_FILE, "juvenile")?)?)?;

    let stack = ModelStack::new(default, juvenile);
    let stack = match load_hybrid(dir) {
        Ok(Some(hybrid)) => {
            tracing::info!("Hybrid pipeline loaded");
            stack.with_hybrid(hybrid)
        }
        Ok(None) => {
            tracing::info!("Hybrid artifacts not found - default pipeline only");
            stack
        }
        Err(e) => {
            tracing::warn!("Hybrid artifacts unusable ({}) - default pipeline only", e);
            stack
        }
    };

    Ok(stack)
}

impl ModelStack {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        load_model_stack(dir.as_ref())
    }
}
