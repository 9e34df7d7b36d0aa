//! Caller-facing scoring engine
//!
//! An [`Engine`] pairs a loaded [`TreeModel`] with the effective evaluation
//! policy. It is cheap to clone and safe to share across threads; the model
//! is never mutated after loading.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::{extract_features, FeatureVector, TripInput};
use crate::model::TreeModel;
use crate::rounding::{round_currency, RoundingMode};
use crate::tree::Decision;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything that went into one result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub input: TripInput,
    pub features: FeatureVector,
    pub path: Vec<Decision>,
    /// Raw leaf value before rounding
    pub leaf: f64,
    pub result: f64,
}

/// Deterministic reimbursement scorer
#[derive(Debug, Clone)]
pub struct Engine {
    model: Arc<TreeModel>,
    rounding: RoundingMode,
    validate_inputs: bool,
}

impl Engine {
    /// Engine over a model, using the model's rounding convention
    pub fn new(model: TreeModel) -> Self {
        let rounding = model.rounding;
        Self {
            model: Arc::new(model),
            rounding,
            validate_inputs: true,
        }
    }

    /// Engine over the embedded canonical tree
    pub fn embedded() -> Result<Self> {
        Ok(Self::new(TreeModel::embedded()?))
    }

    /// Build an engine from configuration
    ///
    /// Loads `model.path` (or the embedded tree), checks `model.expected_hash`
    /// when set and applies the evaluation policy.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let model = match &config.model.path {
            Some(path) => {
                info!("Loading model from: {}", path.display());
                TreeModel::load_json(path)?
            }
            None => TreeModel::embedded()?,
        };

        let hash = model.hash_hex()?;
        if let Some(expected) = &config.model.expected_hash {
            model.verify_hash(expected)?;
            debug!("Model hash verified");
        }

        let mut engine = Self::new(model);
        if let Some(rounding) = config.evaluation.rounding {
            engine.rounding = rounding;
        }
        engine.validate_inputs = config.evaluation.validate_inputs;

        info!(
            "Engine ready: model `{}` ({} leaves, height {}), hash {}, rounding {}",
            engine.model.name,
            engine.model.tree.leaf_count(),
            engine.model.tree.height(),
            hash,
            engine.rounding
        );
        Ok(engine)
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_input_validation(mut self, enabled: bool) -> Self {
        self.validate_inputs = enabled;
        self
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    pub fn validates_inputs(&self) -> bool {
        self.validate_inputs
    }

    fn features_for(&self, input: &TripInput) -> Result<FeatureVector> {
        if self.validate_inputs {
            input.validate()?;
        }
        Ok(extract_features(input))
    }

    /// Reimbursement for one trip, rounded to two decimals
    pub fn evaluate(&self, input: &TripInput) -> Result<f64> {
        let features = self.features_for(input)?;
        self.model.tree.evaluate(&features, self.rounding)
    }

    pub fn evaluate_reimbursement(&self, duration: f64, distance: f64, amount: f64) -> Result<f64> {
        self.evaluate(&TripInput::new(duration, distance, amount))
    }

    /// Evaluate and record the features and decision path used
    pub fn explain(&self, input: &TripInput) -> Result<Explanation> {
        let features = self.features_for(input)?;
        let trace = self.model.tree.trace(&features)?;
        let result = round_currency(trace.leaf, self.rounding)?;

        Ok(Explanation {
            input: *input,
            features,
            path: trace.path,
            leaf: trace.leaf,
            result,
        })
    }
}
