//! Deterministic Reimbursement Scoring Core
//!
//! Maps a trip (duration in days, distance travelled, receipts total) to a
//! reimbursement amount by deriving a fixed feature vector and walking a
//! static decision tree. Identical inputs always produce identical outputs.
//!
//! Modules:
//! - `features`: Feature derivation from raw trip inputs
//! - `tree`: Decision tree nodes, evaluator, traversal trace and flat format
//! - `rounding`: Currency rounding policy
//! - `model`: Model documents (load, save, validate, hash)
//! - `canonical`: Canonical JSON and BLAKE3 fingerprints
//! - `config`: Engine configuration (TOML plus environment overrides)
//! - `engine`: Caller-facing scoring engine
//! - `errors`: Error type shared by every module

pub mod canonical;
pub mod config;
pub mod engine;
pub mod errors;
pub mod features;
pub mod model;
pub mod rounding;
pub mod tree;

pub use config::{EngineConfig, LogFormat};
pub use engine::{Engine, Explanation};
pub use errors::{Result, ScoringError};
pub use features::{derive_features, extract_features, Feature, FeatureVector, TripInput};
pub use model::TreeModel;
pub use rounding::{round_currency, RoundingMode};
pub use tree::{build_tree, DecisionTree, FlatNode, Node};

use once_cell::sync::OnceCell;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static DEFAULT_ENGINE: OnceCell<Engine> = OnceCell::new();

/// Process-wide engine over the embedded tree, built on first use
pub fn default_engine() -> Result<&'static Engine> {
    DEFAULT_ENGINE.get_or_try_init(Engine::embedded)
}

/// Reimbursement for one trip using the embedded tree
///
/// ```rust
/// let amount = reimburse_core::evaluate_reimbursement(5.0, 250.0, 150.75).unwrap();
/// assert_eq!(amount, 619.95);
/// ```
pub fn evaluate_reimbursement(duration: f64, distance: f64, amount: f64) -> Result<f64> {
    default_engine()?.evaluate_reimbursement(duration, distance, amount)
}
