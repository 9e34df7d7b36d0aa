//! Flat (indexed) tree format
//!
//! Offline trainers commonly export trees as a node array where children are
//! referenced by index and node 0 is the root. Index references can dangle,
//! loop or be shared, so a flat tree is compiled into the owned [`Node`] graph
//! exactly once, at load time, and rejected if it is not a proper tree.

use super::node::Node;
use super::DecisionTree;
use crate::errors::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Deepest root-to-leaf path accepted from a flat description
pub const MAX_TREE_DEPTH: usize = 256;

/// One entry of a flat node array
///
/// Leaves carry `value`; splits carry `feature`, `threshold`, `left` and `right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatNode {
    /// Informational id, not used for linking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    #[serde(default, alias = "leaf", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl FlatNode {
    pub fn split(feature: impl Into<String>, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            id: None,
            feature: Some(feature.into()),
            threshold: Some(threshold),
            left: Some(left),
            right: Some(right),
            value: None,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Self {
            id: None,
            feature: None,
            threshold: None,
            left: None,
            right: None,
            value: Some(value),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    OnPath,
    Done,
}

struct Compiler<'a> {
    nodes: &'a [FlatNode],
    marks: Vec<Mark>,
}

impl Compiler<'_> {
    fn compile(&mut self, idx: usize, depth: usize) -> Result<Node> {
        if depth > MAX_TREE_DEPTH {
            return Err(ScoringError::InvalidFormat(format!(
                "tree deeper than {MAX_TREE_DEPTH} levels"
            )));
        }

        let node = self.nodes.get(idx).ok_or_else(|| {
            ScoringError::InvalidFormat(format!(
                "child index {idx} out of range ({} nodes)",
                self.nodes.len()
            ))
        })?;

        match self.marks[idx] {
            Mark::OnPath => {
                return Err(ScoringError::InvalidFormat(format!(
                    "node {idx} is its own ancestor"
                )))
            }
            Mark::Done => {
                return Err(ScoringError::InvalidFormat(format!(
                    "node {idx} has more than one parent"
                )))
            }
            Mark::Unseen => {}
        }
        self.marks[idx] = Mark::OnPath;

        let compiled = match (node.value, node.feature.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(ScoringError::InvalidFormat(format!(
                    "node {idx} has both a feature and a value"
                )))
            }
            (Some(value), None) => {
                if node.left.is_some() || node.right.is_some() || node.threshold.is_some() {
                    return Err(ScoringError::InvalidFormat(format!(
                        "leaf node {idx} has split fields"
                    )));
                }
                Node::leaf(value)
            }
            (None, Some(feature)) => {
                let threshold = node.threshold.ok_or_else(|| {
                    ScoringError::InvalidFormat(format!("split node {idx} has no threshold"))
                })?;
                let (left, right) = match (node.left, node.right) {
                    (Some(left), Some(right)) => (left, right),
                    _ => {
                        return Err(ScoringError::InvalidFormat(format!(
                            "split node {idx} needs both children"
                        )))
                    }
                };
                let left = self.compile(left, depth + 1)?;
                let right = self.compile(right, depth + 1)?;
                Node::split(feature, threshold, left, right)
            }
            (None, None) => {
                return Err(ScoringError::InvalidFormat(format!(
                    "node {idx} has neither a feature nor a value"
                )))
            }
        };

        self.marks[idx] = Mark::Done;
        Ok(compiled)
    }
}

/// Compile a flat node array (root at index 0) into a [`DecisionTree`]
pub fn build_tree(nodes: &[FlatNode]) -> Result<DecisionTree> {
    if nodes.is_empty() {
        return Err(ScoringError::EmptyTree);
    }

    let mut compiler = Compiler {
        nodes,
        marks: vec![Mark::Unseen; nodes.len()],
    };
    let root = compiler.compile(0, 0)?;

    let unreachable = compiler
        .marks
        .iter()
        .filter(|mark| **mark == Mark::Unseen)
        .count();
    if unreachable > 0 {
        warn!("Flat tree has {} unreachable node(s); ignoring them", unreachable);
    }

    Ok(DecisionTree::new(root))
}
