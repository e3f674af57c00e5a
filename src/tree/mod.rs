use std::collections::HashSet;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

pub mod detail;
pub mod impurity;
pub mod layout;
pub mod painter;
pub mod scene_graph;
pub mod viewer;

pub type NodeId = usize;

/// Label reported for samples the label source does not know about.
pub const DEFAULT_LABEL: i64 = 0;

/// Node of a binary decision tree together with its Gini statistics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub gini: f64,
    pub gini_calc: String,
    pub samples: Vec<usize>,
    pub class_counts: Vec<u64>,
    #[serde(default)]
    pub left: Option<Box<TreeNode>>,
    #[serde(default)]
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Build a childless node, deriving the Gini score and its derivation
    /// string from the class counts.
    #[allow(dead_code)]
    pub fn new(id: NodeId, samples: Vec<usize>, class_counts: Vec<u64>) -> Self {
        let (gini, gini_calc) = impurity::gini_formula(&class_counts);
        Self {
            id,
            gini,
            gini_calc,
            samples,
            class_counts,
            left: None,
            right: None,
        }
    }

    #[allow(dead_code)]
    pub fn with_children(mut self, left: Option<TreeNode>, right: Option<TreeNode>) -> Self {
        self.left = left.map(Box::new);
        self.right = right.map(Box::new);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Present children, left before right.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.left.as_deref().into_iter().chain(self.right.as_deref())
    }

    /// Depth-first search (self, left subtree, right subtree); first match wins.
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.left
            .as_deref()
            .and_then(|left| left.find(id))
            .or_else(|| self.right.as_deref().and_then(|right| right.find(id)))
    }

    /// Pre-order traversal over the whole subtree.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Check the structural invariants a loaded tree must satisfy.
    pub fn validate(&self) -> Result<(), TreeError> {
        let expected = self.class_counts.len();
        let mut seen = HashSet::new();

        for node in self.iter() {
            if !seen.insert(node.id) {
                return Err(TreeError::DuplicateId { id: node.id });
            }
            if node.class_counts.len() != expected {
                return Err(TreeError::InconsistentClassCounts {
                    id: node.id,
                    expected,
                    found: node.class_counts.len(),
                });
            }
            if !node.gini.is_finite() {
                return Err(TreeError::InvalidGini {
                    id: node.id,
                    value: node.gini,
                });
            }

            let (derived, _) = impurity::gini_formula(&node.class_counts);
            if (derived - node.gini).abs() > 1e-3 {
                warn!(
                    "node {} reports gini {:.4} but its class counts give {:.4}",
                    node.id, node.gini, derived
                );
            }
        }

        Ok(())
    }
}

pub struct TreeIter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(node)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("node {id} has {found} class counts, expected {expected}")]
    InconsistentClassCounts {
        id: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("node id {id} appears more than once")]
    DuplicateId { id: NodeId },

    #[error("node {id} has a non-finite gini score ({value})")]
    InvalidGini { id: NodeId, value: f64 },
}

/// Read-only mapping from sample index to its true class label.
pub trait LabelSource {
    /// Label of `sample`, or [`DEFAULT_LABEL`] when the index is unknown.
    fn label_for(&self, sample: usize) -> i64;
}

impl LabelSource for [i64] {
    fn label_for(&self, sample: usize) -> i64 {
        self.get(sample).copied().unwrap_or(DEFAULT_LABEL)
    }
}

impl LabelSource for Vec<i64> {
    fn label_for(&self, sample: usize) -> i64 {
        self.as_slice().label_for(sample)
    }
}

/// Held-out sample exported next to the tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestSample {
    pub features: Vec<f64>,
    pub label: i64,
}

/// Contents of a tree data file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeData {
    pub tree: TreeNode,
    #[serde(default)]
    pub train_labels: Vec<i64>,
    #[serde(default)]
    pub test_samples: Vec<TestSample>,
}

impl TreeData {
    #[allow(dead_code)]
    pub fn new(tree: TreeNode, train_labels: Vec<i64>) -> Self {
        Self {
            tree,
            train_labels,
            test_samples: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        self.tree.validate()?;

        let unlabeled = self
            .tree
            .samples
            .iter()
            .filter(|&&sample| sample >= self.train_labels.len())
            .count();
        if unlabeled > 0 {
            warn!(
                "{} root sample(s) have no entry in train_labels; they will use label {}",
                unlabeled, DEFAULT_LABEL
            );
        }

        Ok(())
    }

    pub fn class_count(&self) -> usize {
        self.tree.class_counts.len()
    }
}

impl LabelSource for TreeData {
    fn label_for(&self, sample: usize) -> i64 {
        self.train_labels.label_for(sample)
    }
}
