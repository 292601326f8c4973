// Shared fixtures: small hand-built model exports with known behavior
//
// availability (4 features): SST <= 25 -> P(1)=0.2; else history <= 150 -> 0.4; else 0.9
// quantity     (4 features): history <= 150 -> 40; else SST <= 29 -> 150; else 320
// juvenile     (3 features): SST <= 24 -> High; else salinity <= 31 -> Medium; else Low
// hybrid: PCA onto (SST - 28, history - 250), hard-voting classifier, voting regressor

#![allow(dead_code)]

use catch_scorer_rust::models::artifacts::{
    AVAILABILITY_MODEL_FILE, HYBRID_AVAILABILITY_MODEL_FILE, HYBRID_QUANTITY_MODEL_FILE, JUVENILE_MODEL_FILE,
    PCA_TRANSFORM_FILE, QUANTITY_MODEL_FILE,
};
use catch_scorer_rust::models::{
    parse_classifier, parse_regressor, ClassLabel, Classifier, DefaultPipeline, JuvenileModel,
};
use catch_scorer_rust::{ModelStack, PredictionError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const AVAILABILITY_JSON: &str = r#"{
    "model_type": "random_forest",
    "name": "availability",
    "n_features": 4,
    "classes": [0, 1],
    "trees": [{"nodes": [
        {"feature": 0, "threshold": 25.0, "left": 1, "right": 2},
        {"feature": -1, "value": [8.0, 2.0]},
        {"feature": 3, "threshold": 150.0, "left": 3, "right": 4},
        {"feature": -1, "value": [6.0, 4.0]},
        {"feature": -1, "value": [1.0, 9.0]}
    ]}]
}"#;

pub const QUANTITY_JSON: &str = r#"{
    "model_type": "random_forest",
    "name": "quantity",
    "n_features": 4,
    "trees": [{"nodes": [
        {"feature": 3, "threshold": 150.0, "left": 1, "right": 2},
        {"feature": -1, "value": [40.0]},
        {"feature": 0, "threshold": 29.0, "left": 3, "right": 4},
        {"feature": -1, "value": [150.0]},
        {"feature": -1, "value": [320.0]}
    ]}]
}"#;

pub const JUVENILE_JSON: &str = r#"{
    "model_type": "random_forest",
    "name": "juvenile",
    "n_features": 3,
    "classes": ["High", "Low", "Medium"],
    "trees": [{"nodes": [
        {"feature": 0, "threshold": 24.0, "left": 1, "right": 2},
        {"feature": -1, "value": [9.0, 1.0, 0.0]},
        {"feature": 1, "threshold": 31.0, "left": 3, "right": 4},
        {"feature": -1, "value": [1.0, 2.0, 7.0]},
        {"feature": -1, "value": [0.0, 9.0, 1.0]}
    ]}]
}"#;

pub const PCA_JSON: &str = r#"{
    "model_type": "pca",
    "mean": [28.0, 34.0, 6.0, 250.0],
    "components": [[1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
}"#;

pub const HYBRID_AVAILABILITY_JSON: &str = r#"{
    "model_type": "voting",
    "voting": "hard",
    "estimators": [
        {"model_type": "random_forest", "n_features": 2, "classes": [0, 1],
         "trees": [{"nodes": [
            {"feature": 1, "threshold": 0.0, "left": 1, "right": 2},
            {"feature": -1, "value": [7.0, 3.0]},
            {"feature": -1, "value": [2.0, 8.0]}
         ]}]},
        {"model_type": "random_forest", "n_features": 2, "classes": [0, 1],
         "trees": [{"nodes": [{"feature": -1, "value": [4.0, 6.0]}]}]}
    ]
}"#;

pub const HYBRID_QUANTITY_JSON: &str = r#"{
    "model_type": "voting",
    "estimators": [
        {"model_type": "gradient_boosting", "n_features": 2, "init": 200.0, "learning_rate": 1.0,
         "trees": [{"nodes": [
            {"feature": 1, "threshold": 0.0, "left": 1, "right": 2},
            {"feature": -1, "value": [-50.0]},
            {"feature": -1, "value": [100.0]}
         ]}]},
        {"model_type": "random_forest", "n_features": 2,
         "trees": [{"nodes": [{"feature": -1, "value": [300.0]}]}]}
    ]
}"#;

/// Scratch models directory, removed on drop
pub struct ModelDir {
    path: PathBuf,
}

impl ModelDir {
    pub fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!("catch_scorer_{}_{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create models dir");
        Self { path }
    }

    /// Directory with the three required artifacts
    pub fn base(tag: &str) -> Self {
        let dir = Self::new(tag);
        dir.write(AVAILABILITY_MODEL_FILE, AVAILABILITY_JSON);
        dir.write(QUANTITY_MODEL_FILE, QUANTITY_JSON);
        dir.write(JUVENILE_MODEL_FILE, JUVENILE_JSON);
        dir
    }

    /// Required artifacts plus the full hybrid set
    pub fn with_hybrid(tag: &str) -> Self {
        let dir = Self::base(tag);
        dir.write(PCA_TRANSFORM_FILE, PCA_JSON);
        dir.write(HYBRID_AVAILABILITY_MODEL_FILE, HYBRID_AVAILABILITY_JSON);
        dir.write(HYBRID_QUANTITY_MODEL_FILE, HYBRID_QUANTITY_JSON);
        dir
    }

    pub fn write(&self, file: &str, contents: &str) {
        std::fs::write(self.path.join(file), contents).expect("write artifact");
    }

    pub fn remove(&self, file: &str) {
        std::fs::remove_file(self.path.join(file)).expect("remove artifact");
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ModelDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn load_stack(tag: &str, hybrid: bool) -> Arc<ModelStack> {
    let dir = if hybrid { ModelDir::with_hybrid(tag) } else { ModelDir::base(tag) };
    Arc::new(ModelStack::load(dir.path()).expect("fixture stack loads"))
}

/// Availability classifier whose every call fails
#[derive(Debug)]
pub struct BrokenClassifier {
    classes: Vec<ClassLabel>,
}

impl Classifier for BrokenClassifier {
    fn name(&self) -> &str {
        "broken"
    }

    fn n_features(&self) -> usize {
        4
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict(&self, _features: &[f64]) -> catch_scorer_rust::Result<ClassLabel> {
        Err(PredictionError::InvalidArtifact {
            model: "broken".to_string(),
            reason: "corrupt tree".to_string(),
        })
    }
}

/// Stack whose availability model fails on every inference
pub fn broken_stack() -> Arc<ModelStack> {
    let classifier = Box::new(BrokenClassifier {
        classes: vec![ClassLabel::Int(0), ClassLabel::Int(1)],
    });
    let regressor = parse_regressor(QUANTITY_JSON, "quantity").expect("quantity fixture");
    let juvenile = parse_classifier(JUVENILE_JSON, "juvenile").expect("juvenile fixture");

    let default = DefaultPipeline::new(classifier, regressor).expect("default pipeline");
    let juvenile = JuvenileModel::new(juvenile).expect("juvenile model");
    Arc::new(ModelStack::new(default, juvenile))
}
