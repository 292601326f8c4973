//! Error types for the catch scorer
//!
//! Two families live here:
//! - configuration errors (missing mandatory model, feature-shape mismatch,
//!   broken artifact): fatal for the request, never retried
//! - request errors (out-of-range grid parameters, unknown region, exhausted
//!   scoring budget)
//!
//! Optional-capability absence (no hybrid set, no probabilities) is not an
//! error at all; the model layer falls back and logs it.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, PredictionError>;

#[derive(Debug, Error)]
pub enum PredictionError {
    /// A mandatory model artifact is absent
    #[error("required model '{model}' is not loaded (expected at {path:?})")]
    MissingModel { model: &'static str, path: PathBuf },

    /// Feature vector width does not match what the model was fit on
    #[error("feature shape mismatch for '{model}': expected {expected} columns, got {actual}")]
    FeatureShape {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read model artifact {path:?}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path:?}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact parsed but is structurally unusable (bad node index, empty ensemble, ...)
    #[error("invalid model artifact '{model}': {reason}")]
    InvalidArtifact { model: String, reason: String },

    /// Classifier produced a label the decision layer cannot interpret
    #[error("model '{model}' produced unknown class label '{label}'")]
    UnknownLabel { model: String, label: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("grid scoring exceeded its deadline after {scored} of {total} points")]
    DeadlineExceeded { scored: usize, total: usize },

    #[error("grid scoring was cancelled")]
    Cancelled,
}

impl PredictionError {
    pub(crate) fn invalid_artifact(model: impl Into<String>, reason: impl Into<String>) -> Self {
        PredictionError::InvalidArtifact {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that indicate a broken model configuration rather than a bad request
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PredictionError::MissingModel { .. }
                | PredictionError::FeatureShape { .. }
                | PredictionError::ArtifactIo { .. }
                | PredictionError::ArtifactParse { .. }
                | PredictionError::InvalidArtifact { .. }
                | PredictionError::UnknownLabel { .. }
        )
    }
}
