//! Decision tree nodes
//!
//! A node is either a split on one named feature or a leaf holding the output
//! value. Children are owned exclusively through `Box`, so a tree built from
//! `Node` values is finite and acyclic by construction.

use serde::{Deserialize, Serialize};

/// A decision tree node (split or leaf)
///
/// Serialized in the nested record format:
/// `{"feature": .., "threshold": .., "left": {..}, "right": {..}}` for splits
/// and `{"value": ..}` for leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go `left` when `feature <= threshold`, otherwise `right`
    Split {
        feature: String,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Terminal node carrying the raw, unrounded output
    Leaf { value: f64 },
}

impl Node {
    /// Create a split node
    pub fn split(feature: impl Into<String>, threshold: f64, left: Node, right: Node) -> Self {
        Node::Split {
            feature: feature.into(),
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a leaf node
    pub fn leaf(value: f64) -> Self {
        Node::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Leaf value, `None` for splits
    pub fn leaf_value(&self) -> Option<f64> {
        match self {
            Node::Leaf { value } => Some(*value),
            Node::Split { .. } => None,
        }
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.height().max(right.height()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Visit every node depth-first, left subtree before right
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Node::Split { left, right, .. } = self {
            left.walk(visit);
            right.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::split(
            "duration_x_distance",
            566.0,
            Node::leaf(336.31),
            Node::split(
                "duration_x_amount",
                487.54,
                Node::leaf(196.57),
                Node::leaf(559.32),
            ),
        )
    }

    #[test]
    fn test_node_shape() {
        let root = sample();
        assert!(!root.is_leaf());
        assert_eq!(root.leaf_value(), None);
        assert_eq!(root.height(), 2);
        assert_eq!(root.leaf_count(), 3);
        assert_eq!(Node::leaf(1.0).height(), 0);
    }

    #[test]
    fn test_walk_order() {
        let root = sample();
        let mut leaves = Vec::new();
        root.walk(&mut |node| {
            if let Some(v) = node.leaf_value() {
                leaves.push(v);
            }
        });
        assert_eq!(leaves, vec![336.31, 196.57, 559.32]);
    }

    #[test]
    fn test_nested_json_format() {
        let json = r#"{
            "feature": "amount",
            "threshold": 828,
            "left": {"value": 100.5},
            "right": {"value": 900}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(
            node,
            Node::split("amount", 828.0, Node::leaf(100.5), Node::leaf(900.0))
        );

        let encoded = serde_json::to_string(&Node::leaf(2.5)).unwrap();
        assert_eq!(encoded, r#"{"value":2.5}"#);
    }

    #[test]
    fn test_incomplete_split_is_rejected() {
        let json = r#"{"feature": "amount", "threshold": 1.0, "left": {"value": 1.0}}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }
}
