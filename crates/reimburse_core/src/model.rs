//! Tree model documents
//!
//! A model document packages one decision tree with the rounding convention it
//! was compiled under:
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "reimbursement-v1",
//!   "rounding": "half_even",
//!   "tree": {"feature": "amount", "threshold": 828.1, "left": {..}, "right": {..}}
//! }
//! ```
//!
//! The flat form replaces `"tree"` with `"nodes": [..]` (see
//! [`crate::tree::FlatNode`]). Documents are always written back in the nested
//! form, as canonical JSON, and identified by the BLAKE3 hash of that encoding.

use crate::canonical::{hash_canonical_hex, to_canonical_json};
use crate::errors::{Result, ScoringError};
use crate::features::FeatureVector;
use crate::rounding::RoundingMode;
use crate::tree::{build_tree, DecisionTree, FlatNode, Node};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Only supported document version
pub const MODEL_VERSION: u32 = 1;

/// Canonical production tree shipped with the crate
const EMBEDDED_MODEL: &str = include_str!("../models/reimbursement_v1.json");

fn default_version() -> u32 {
    MODEL_VERSION
}

/// On-disk shape, before the tree form is resolved
#[derive(Debug, Deserialize)]
struct ModelDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rounding: RoundingMode,
    #[serde(default)]
    tree: Option<Node>,
    #[serde(default)]
    nodes: Option<Vec<FlatNode>>,
}

/// A validated decision tree plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeModel {
    pub version: u32,
    pub name: String,
    pub rounding: RoundingMode,
    pub tree: DecisionTree,
}

impl TreeModel {
    /// Wrap a tree with default metadata
    pub fn new(name: impl Into<String>, tree: DecisionTree) -> Self {
        Self {
            version: MODEL_VERSION,
            name: name.into(),
            rounding: RoundingMode::default(),
            tree,
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// The canonical reimbursement tree compiled into the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_MODEL)
    }

    /// Parse and validate a model document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: ModelDocument = serde_json::from_str(json)?;

        let tree = match (document.tree, document.nodes) {
            (Some(_), Some(_)) => {
                return Err(ScoringError::InvalidFormat(
                    "model declares both `tree` and `nodes`".into(),
                ))
            }
            (Some(root), None) => DecisionTree::new(root),
            (None, Some(nodes)) => build_tree(&nodes)?,
            (None, None) => return Err(ScoringError::EmptyTree),
        };

        let model = Self {
            version: document.version,
            name: document.name.unwrap_or_else(|| "unnamed".to_string()),
            rounding: document.rounding,
            tree,
        };
        model.validate()?;

        debug!(
            "Parsed model `{}`: {} leaves, height {}",
            model.name,
            model.tree.leaf_count(),
            model.tree.height()
        );
        Ok(model)
    }

    /// Load and validate a model document from disk
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save as canonical JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Validate version and tree structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(ScoringError::InvalidFormat(format!(
                "unsupported model version: {}",
                self.version
            )));
        }
        self.tree.validate()
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_json(self)?)
    }

    /// BLAKE3 hash of the canonical JSON, hex encoded
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Check the model against a pinned hash (case-insensitive hex)
    pub fn verify_hash(&self, expected: &str) -> Result<()> {
        let actual = self.hash_hex()?;
        if actual.eq_ignore_ascii_case(expected.trim()) {
            Ok(())
        } else {
            Err(ScoringError::HashMismatch {
                expected: expected.trim().to_string(),
                actual,
            })
        }
    }

    /// Evaluate with the model's own rounding convention
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64> {
        self.tree.evaluate(features, self.rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;

    fn sample_model() -> TreeModel {
        TreeModel::new(
            "sample",
            DecisionTree::new(Node::split(
                "duration_x_distance",
                566.0,
                Node::leaf(336.31),
                Node::split(
                    "duration_x_amount",
                    487.54,
                    Node::leaf(196.57),
                    Node::leaf(559.32),
                ),
            )),
        )
    }

    #[test]
    fn test_embedded_model_loads() {
        let model = TreeModel::embedded().unwrap();
        assert_eq!(model.version, 1);
        assert_eq!(model.name, "reimbursement-v1");
        assert_eq!(model.rounding, RoundingMode::HalfEven);
        assert_eq!(model.tree.leaf_count(), 63);
        assert_eq!(model.tree.height(), 7);
    }

    #[test]
    fn test_nested_document() {
        let json = r#"{
            "version": 1,
            "name": "tiny",
            "rounding": "half_away_from_zero",
            "tree": {"feature": "amount", "threshold": 10, "left": {"value": 1.005}, "right": {"value": 2}}
        }"#;
        let model = TreeModel::from_json_str(json).unwrap();

        assert_eq!(model.rounding, RoundingMode::HalfAwayFromZero);
        assert_eq!(model.evaluate(&derive_features(1.0, 1.0, 10.0)).unwrap(), 1.01);
        assert_eq!(model.evaluate(&derive_features(1.0, 1.0, 11.0)).unwrap(), 2.0);
    }

    #[test]
    fn test_flat_document() {
        let json = r#"{
            "name": "flat",
            "nodes": [
                {"id": 0, "feature": "duration", "threshold": 4.5, "left": 1, "right": 2},
                {"id": 1, "value": 492.73},
                {"id": 2, "value": 619.95}
            ]
        }"#;
        let model = TreeModel::from_json_str(json).unwrap();

        assert_eq!(model.version, MODEL_VERSION);
        assert_eq!(model.evaluate(&derive_features(4.0, 0.0, 0.0)).unwrap(), 492.73);
        assert_eq!(model.evaluate(&derive_features(5.0, 0.0, 0.0)).unwrap(), 619.95);
    }

    #[test]
    fn test_missing_or_null_tree_is_empty() {
        assert!(matches!(
            TreeModel::from_json_str(r#"{"version": 1}"#),
            Err(ScoringError::EmptyTree)
        ));
        assert!(matches!(
            TreeModel::from_json_str(r#"{"version": 1, "tree": null}"#),
            Err(ScoringError::EmptyTree)
        ));
        assert!(matches!(
            TreeModel::from_json_str(r#"{"nodes": []}"#),
            Err(ScoringError::EmptyTree)
        ));
    }

    #[test]
    fn test_document_rejections() {
        let both = r#"{"tree": {"value": 1}, "nodes": [{"value": 1}]}"#;
        assert!(matches!(
            TreeModel::from_json_str(both),
            Err(ScoringError::InvalidFormat(_))
        ));

        let future = r#"{"version": 2, "tree": {"value": 1}}"#;
        assert!(matches!(
            TreeModel::from_json_str(future),
            Err(ScoringError::InvalidFormat(_))
        ));

        let unknown = r#"{"tree": {"feature": "log_miles", "threshold": 1, "left": {"value": 1}, "right": {"value": 2}}}"#;
        assert!(matches!(
            TreeModel::from_json_str(unknown),
            Err(ScoringError::UnknownFeature(_))
        ));

        let huge_leaf = r#"{"tree": {"feature": "amount", "threshold": 1, "left": {"value": 1}, "right": {"value": 1e29}}}"#;
        assert!(matches!(
            TreeModel::from_json_str(huge_leaf),
            Err(ScoringError::InvalidFormat(_))
        ));

        assert!(matches!(
            TreeModel::from_json_str("not json"),
            Err(ScoringError::Json(_))
        ));
    }

    #[test]
    fn test_canonical_json_is_compact_and_sorted() {
        let json = sample_model().to_canonical_json().unwrap();

        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"name":"sample","rounding":"half_even","tree":{"feature":"duration_x_distance","left":{"value":336.31}"#));
        assert!(json.ends_with(r#""version":1}"#));
    }

    #[test]
    fn test_save_load_roundtrip() {
        use tempfile::NamedTempFile;

        let model = sample_model();
        let file = NamedTempFile::new().unwrap();

        model.save_json(file.path()).unwrap();
        let loaded = TreeModel::load_json(file.path()).unwrap();

        assert_eq!(model, loaded);
        assert_eq!(model.hash_hex().unwrap(), loaded.hash_hex().unwrap());
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = sample_model();
        let b = sample_model();
        assert_eq!(a.hash_hex().unwrap(), b.hash_hex().unwrap());
        assert_eq!(a.hash_hex().unwrap().len(), 64);

        let c = sample_model().with_rounding(RoundingMode::HalfTowardZero);
        assert_ne!(a.hash_hex().unwrap(), c.hash_hex().unwrap());
    }

    #[test]
    fn test_verify_hash() {
        let model = sample_model();
        let hash = model.hash_hex().unwrap();

        assert!(model.verify_hash(&hash).is_ok());
        assert!(model.verify_hash(&hash.to_uppercase()).is_ok());
        assert!(matches!(
            model.verify_hash("00"),
            Err(ScoringError::HashMismatch { .. })
        ));
    }
}
