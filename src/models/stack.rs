//! Model Stack - process-wide, read-only inference context
//!
//! Holds the base pipeline, the optional hybrid pipeline and the juvenile
//! classifier. Built once at startup (see `artifacts::load_model_stack`),
//! wrapped in an `Arc` and shared by every request; nothing here is mutated
//! after construction, so inference needs no locking.
//!
//! Pipeline selection happens in one place (`ModelStack::pipeline`): a Hybrid
//! request silently runs the Default pipeline when the hybrid set is absent.

use super::confidence::{availability_confidence, high_risk_column, juvenile_confidence};
use super::{check_shape, Classifier, Reducer, Regressor};
use crate::data::{JuvenileRisk, PipelineChoice};
use crate::error::{PredictionError, Result};
use crate::features::{AvailabilityFeatures, JuvenileFeatures, AVAILABILITY_FEATURE_COUNT, JUVENILE_FEATURE_COUNT};
use crate::models::ClassLabel;

/// Availability + quantity from one pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOutput {
    /// Hard label of the availability classifier
    pub available: bool,
    pub availability_probability: f64,
    /// Raw regressor output (kg)
    pub quantity_kg: f64,
}

/// Common capability of the Default and Hybrid pipelines
pub trait AvailabilityPipeline: Send + Sync {
    fn choice(&self) -> PipelineChoice;
    fn infer(&self, features: &AvailabilityFeatures) -> Result<PipelineOutput>;
}

// ============================================================================
// Default pipeline
// ============================================================================

#[derive(Debug)]
pub struct DefaultPipeline {
    classifier: Box<dyn Classifier>,
    regressor: Box<dyn Regressor>,
}

impl DefaultPipeline {
    pub fn new(classifier: Box<dyn Classifier>, regressor: Box<dyn Regressor>) -> Result<Self> {
        check_shape(classifier.name(), classifier.n_features(), AVAILABILITY_FEATURE_COUNT)?;
        check_shape(regressor.name(), regressor.n_features(), AVAILABILITY_FEATURE_COUNT)?;
        Ok(Self { classifier, regressor })
    }
}

impl AvailabilityPipeline for DefaultPipeline {
    fn choice(&self) -> PipelineChoice {
        PipelineChoice::Default
    }

    fn infer(&self, features: &AvailabilityFeatures) -> Result<PipelineOutput> {
        let x = features.as_slice();
        let availability = availability_confidence(self.classifier.as_ref(), x)?;
        let quantity_kg = self.regressor.predict(x)?;
        Ok(PipelineOutput {
            available: availability.available,
            availability_probability: availability.probability,
            quantity_kg,
        })
    }
}

// ============================================================================
// Hybrid pipeline
// ============================================================================

/// Reducer followed by voting ensembles fit on the reduced space
#[derive(Debug)]
pub struct HybridPipeline {
    reducer: Box<dyn Reducer>,
    classifier: Box<dyn Classifier>,
    regressor: Box<dyn Regressor>,
}

impl HybridPipeline {
    pub fn new(
        reducer: Box<dyn Reducer>,
        classifier: Box<dyn Classifier>,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self> {
        check_shape(reducer.name(), reducer.n_features(), AVAILABILITY_FEATURE_COUNT)?;
        let reduced = reducer.n_components();
        check_shape(classifier.name(), classifier.n_features(), reduced)?;
        check_shape(regressor.name(), regressor.n_features(), reduced)?;
        Ok(Self {
            reducer,
            classifier,
            regressor,
        })
    }
}

impl AvailabilityPipeline for HybridPipeline {
    fn choice(&self) -> PipelineChoice {
        PipelineChoice::Hybrid
    }

    fn infer(&self, features: &AvailabilityFeatures) -> Result<PipelineOutput> {
        let reduced = self.reducer.transform(features.as_slice())?;
        let availability = availability_confidence(self.classifier.as_ref(), &reduced)?;
        let quantity_kg = self.regressor.predict(&reduced)?;
        Ok(PipelineOutput {
            available: availability.available,
            availability_probability: availability.probability,
            quantity_kg,
        })
    }
}

// ============================================================================
// Juvenile classifier
// ============================================================================

#[derive(Debug)]
pub struct JuvenileModel {
    classifier: Box<dyn Classifier>,
}

impl JuvenileModel {
    /// Every class label must name a risk level; a missing "High" class only
    /// disables the probability path
    pub fn new(classifier: Box<dyn Classifier>) -> Result<Self> {
        check_shape(classifier.name(), classifier.n_features(), JUVENILE_FEATURE_COUNT)?;

        for class in classifier.classes() {
            let known = match class {
                ClassLabel::Text(s) => JuvenileRisk::from_label(s).is_some(),
                ClassLabel::Int(_) => false,
            };
            if !known {
                return Err(PredictionError::UnknownLabel {
                    model: classifier.name().to_string(),
                    label: class.to_string(),
                });
            }
        }
        if classifier.has_probabilities() && high_risk_column(classifier.as_ref()).is_none() {
            tracing::warn!(
                model = classifier.name(),
                "juvenile classifier has no 'High' class; probabilities fall back to label severity"
            );
        }

        Ok(Self { classifier })
    }
}

// ============================================================================
// Model stack
// ============================================================================

/// Raw, rule-free inference for one reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub available: bool,
    pub availability_probability: f64,
    pub quantity_kg: f64,
    pub juvenile_risk: JuvenileRisk,
    pub juvenile_probability: f64,
    pub pipeline_used: PipelineChoice,
}

#[derive(Debug)]
pub struct ModelStack {
    default: DefaultPipeline,
    hybrid: Option<HybridPipeline>,
    juvenile: JuvenileModel,
}

impl ModelStack {
    pub fn new(default: DefaultPipeline, juvenile: JuvenileModel) -> Self {
        Self {
            default,
            hybrid: None,
            juvenile,
        }
    }

    pub fn with_hybrid(mut self, hybrid: HybridPipeline) -> Self {
        self.hybrid = Some(hybrid);
        self
    }

    pub fn hybrid_available(&self) -> bool {
        self.hybrid.is_some()
    }

    /// Pipeline that will actually serve `choice`
    pub fn pipeline(&self, choice: PipelineChoice) -> &dyn AvailabilityPipeline {
        match (choice, &self.hybrid) {
            (PipelineChoice::Hybrid, Some(hybrid)) => hybrid as &dyn AvailabilityPipeline,
            (PipelineChoice::Hybrid, None) => {
                tracing::debug!("hybrid pipeline requested but not loaded; using default");
                &self.default
            }
            (PipelineChoice::Default, _) => &self.default,
        }
    }

    /// Run availability, quantity and juvenile models for one reading.
    ///
    /// Juvenile risk always comes from the 3-field vector, whichever pipeline runs.
    pub fn infer(
        &self,
        choice: PipelineChoice,
        main: &AvailabilityFeatures,
        juvenile: &JuvenileFeatures,
    ) -> Result<Inference> {
        let pipeline = self.pipeline(choice);
        let output = pipeline.infer(main)?;
        let risk = juvenile_confidence(self.juvenile.classifier.as_ref(), juvenile.as_slice())?;

        Ok(Inference {
            available: output.available,
            availability_probability: output.availability_probability,
            quantity_kg: output.quantity_kg,
            juvenile_risk: risk.risk,
            juvenile_probability: risk.probability,
            pipeline_used: pipeline.choice(),
        })
    }
}
