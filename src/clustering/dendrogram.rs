//! The binary merge tree produced by hierarchical clustering.

use im::OrdSet;
use serde::{Deserialize, Serialize};

/// A node in the dendrogram: either a single unit or the merge of two
/// disjoint subtrees, tagged with the average coupling at merge time.
///
/// Merge couplings are not monotone from leaves to root; average linkage
/// over a non-metric score can merge later at a higher value than earlier.
/// Consumers must not assume sorted heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DendrogramNode {
    Leaf {
        unit: String,
    },
    Internal {
        /// Union of both children's unit sets; the children are disjoint.
        units: OrdSet<String>,
        /// Average coupling between the two children at the moment of merge.
        coupling: f64,
        left: Box<DendrogramNode>,
        right: Box<DendrogramNode>,
    },
}

impl DendrogramNode {
    pub fn leaf(unit: impl Into<String>) -> Self {
        DendrogramNode::Leaf { unit: unit.into() }
    }

    pub fn merge(left: DendrogramNode, right: DendrogramNode, coupling: f64) -> Self {
        let units = left.units().union(right.units());
        DendrogramNode::Internal {
            units,
            coupling,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DendrogramNode::Leaf { .. })
    }

    /// The unit set covered by this subtree.
    pub fn units(&self) -> OrdSet<String> {
        match self {
            DendrogramNode::Leaf { unit } => OrdSet::unit(unit.clone()),
            DendrogramNode::Internal { units, .. } => units.clone(),
        }
    }

    /// Merge coupling for internal nodes; leaves sit at 0.0.
    pub fn coupling(&self) -> f64 {
        match self {
            DendrogramNode::Leaf { .. } => 0.0,
            DendrogramNode::Internal { coupling, .. } => *coupling,
        }
    }

    pub fn children(&self) -> Option<(&DendrogramNode, &DendrogramNode)> {
        match self {
            DendrogramNode::Leaf { .. } => None,
            DendrogramNode::Internal { left, right, .. } => Some((left, right)),
        }
    }

    /// Smallest unit id in this subtree; canonical representative used for
    /// tie-breaking and stable output ordering.
    pub fn representative(&self) -> &str {
        match self {
            DendrogramNode::Leaf { unit } => unit,
            DendrogramNode::Internal { units, .. } => {
                units.get_min().map(String::as_str).unwrap_or_default()
            }
        }
    }

    /// Leaf units in left-to-right tree order, via an explicit work stack.
    /// Renderers use this ordering to lay leaves out without crossings.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                DendrogramNode::Leaf { unit } => out.push(unit.as_str()),
                DendrogramNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Number of internal (merge) nodes in this subtree.
    pub fn internal_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let DendrogramNode::Internal { left, right, .. } = node {
                count += 1;
                stack.push(left);
                stack.push(right);
            }
        }
        count
    }

    /// Height of the tree in edges; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            if let DendrogramNode::Internal { left, right, .. } = node {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max
    }
}
