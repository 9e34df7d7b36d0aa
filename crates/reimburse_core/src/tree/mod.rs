//! Decision tree evaluator
//!
//! Walks a static binary tree from the root, comparing one named feature per
//! split against its threshold, until a leaf is reached. The leaf value is
//! rounded to currency precision once, at the very end.
//!
//! # Tie-break
//!
//! A split sends `feature <= threshold` to the **left** child. Trees compiled
//! from historical tooling rely on this exact rule at every boundary.
//!
//! # Termination
//!
//! Trees built from [`Node`] own their children, so every walk ends at a leaf
//! after at most [`DecisionTree::height`] comparisons. Flat descriptions are
//! checked for cycles when they are compiled (see [`flat::build_tree`]).
//!
//! # Usage
//!
//! ```rust
//! use reimburse_core::features::derive_features;
//! use reimburse_core::rounding::RoundingMode;
//! use reimburse_core::tree::{DecisionTree, Node};
//!
//! let tree = DecisionTree::new(Node::split(
//!     "duration_x_distance",
//!     566.0,
//!     Node::leaf(336.31),
//!     Node::leaf(559.32),
//! ));
//!
//! let features = derive_features(3.0, 50.0, 10.0);
//! assert_eq!(tree.evaluate(&features, RoundingMode::HalfEven).unwrap(), 336.31);
//! ```

pub mod flat;
pub mod node;

pub use flat::{build_tree, FlatNode, MAX_TREE_DEPTH};
pub use node::Node;

use crate::errors::{Result, ScoringError};
use crate::features::{Feature, FeatureVector};
use crate::rounding::{round_currency, RoundingMode};
use serde::{Deserialize, Serialize};

/// Which child a split selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Left,
    Right,
}

/// One comparison made while walking the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub feature: String,
    pub value: f64,
    pub threshold: f64,
    pub branch: Branch,
}

/// Full record of a walk: the decisions taken and the raw leaf reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub path: Vec<Decision>,
    pub leaf: f64,
}

/// A read-only decision tree; `null` in JSON is the empty tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionTree {
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(root: Node) -> Self {
        Self { root: Some(root) }
    }

    /// A tree with no root; evaluating it fails with `EmptyTree`
    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Longest root-to-leaf path, in comparisons
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::height)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaf_count)
    }

    /// Raw (unrounded) value of the leaf selected by `features`
    pub fn find_leaf(&self, features: &FeatureVector) -> Result<f64> {
        find_leaf(self.root(), features)
    }

    /// Leaf value selected by `features`, rounded to currency precision
    pub fn evaluate(&self, features: &FeatureVector, rounding: RoundingMode) -> Result<f64> {
        evaluate(self.root(), features, rounding)
    }

    /// Walk the tree recording every comparison
    pub fn trace(&self, features: &FeatureVector) -> Result<Trace> {
        let mut node = self.root().ok_or(ScoringError::EmptyTree)?;
        let mut path = Vec::with_capacity(self.height());

        loop {
            match node {
                Node::Leaf { value } => {
                    return Ok(Trace {
                        path,
                        leaf: *value,
                    })
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.lookup(feature)?;
                    let branch = if value <= *threshold {
                        Branch::Left
                    } else {
                        Branch::Right
                    };
                    path.push(Decision {
                        feature: feature.clone(),
                        value,
                        threshold: *threshold,
                        branch,
                    });
                    node = match branch {
                        Branch::Left => left,
                        Branch::Right => right,
                    };
                }
            }
        }
    }

    /// Distinct feature names referenced by splits, in first-seen order
    pub fn referenced_features(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        if let Some(root) = &self.root {
            root.walk(&mut |node| {
                if let Node::Split { feature, .. } = node {
                    if !names.contains(&feature.as_str()) {
                        names.push(feature);
                    }
                }
            });
        }
        names
    }

    /// Load-time structural check
    ///
    /// Rejects an empty tree, non-finite thresholds or leaf values, leaves outside
    /// the range currency rounding supports, and feature
    /// names the deriver does not produce.
    pub fn validate(&self) -> Result<()> {
        let root = self.root().ok_or(ScoringError::EmptyTree)?;

        let mut first_error = None;
        root.walk(&mut |node| {
            if first_error.is_some() {
                return;
            }
            first_error = match node {
                Node::Split {
                    feature, threshold, ..
                } => {
                    if Feature::from_name(feature).is_none() {
                        Some(ScoringError::UnknownFeature(feature.clone()))
                    } else if !threshold.is_finite() {
                        Some(ScoringError::InvalidFormat(format!(
                            "split on `{feature}` has non-finite threshold {threshold}"
                        )))
                    } else {
                        None
                    }
                }
                Node::Leaf { value } if !value.is_finite() => Some(ScoringError::InvalidFormat(
                    format!("leaf has non-finite value {value}"),
                )),
                Node::Leaf { value } if round_currency(*value, RoundingMode::HalfEven).is_err() => {
                    Some(ScoringError::InvalidFormat(format!(
                        "leaf value {value} is outside the roundable range"
                    )))
                }
                Node::Leaf { .. } => None,
            };
        });

        first_error.map_or(Ok(()), Err)
    }
}

/// Raw value of the leaf reached from `root`
///
/// Fails with `EmptyTree` when there is no root and with `UnknownFeature` as
/// soon as a split names a feature missing from `features`.
pub fn find_leaf(root: Option<&Node>, features: &FeatureVector) -> Result<f64> {
    let mut node = root.ok_or(ScoringError::EmptyTree)?;

    loop {
        match node {
            Node::Leaf { value } => return Ok(*value),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                node = if features.lookup(feature)? <= *threshold {
                    left
                } else {
                    right
                };
            }
        }
    }
}

/// Evaluate the tree at `root` and round the leaf value once
pub fn evaluate(root: Option<&Node>, features: &FeatureVector, rounding: RoundingMode) -> Result<f64> {
    let leaf = find_leaf(root, features)?;
    round_currency(leaf, rounding)
}
