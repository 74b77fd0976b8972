//! Module extraction: reading a partition of units off the dendrogram.

use super::dendrogram::DendrogramNode;
use super::hierarchical::build_dendrogram;
use crate::core::ModulePartition;
use crate::coupling::CouplingMatrix;
use im::OrdSet;
use serde::{Deserialize, Serialize};

/// How to cut the dendrogram into modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// One module per original unit, ignoring the tree above the leaves.
    /// Baseline/debug view rather than real architecture recovery.
    Finest,
    /// Descend from the root and cut wherever the merge coupling drops
    /// below the threshold, emitting that subtree's unit set as one module.
    #[default]
    Threshold,
}

/// Cluster the matrix and cut the resulting tree with the coupling
/// threshold. An empty matrix yields an empty partition.
pub fn identify_modules(matrix: &CouplingMatrix, coupling_threshold: f64) -> ModulePartition {
    identify_modules_with_mode(matrix, coupling_threshold, ExtractionMode::Threshold)
}

/// [`identify_modules`] with an explicit extraction mode. `Finest` ignores
/// the threshold.
pub fn identify_modules_with_mode(
    matrix: &CouplingMatrix,
    coupling_threshold: f64,
    mode: ExtractionMode,
) -> ModulePartition {
    match build_dendrogram(matrix) {
        Some(root) => extract_partition(&root, coupling_threshold, mode),
        None => ModulePartition::default(),
    }
}

/// Cut an already-built dendrogram into a partition.
pub fn extract_partition(
    root: &DendrogramNode,
    coupling_threshold: f64,
    mode: ExtractionMode,
) -> ModulePartition {
    let modules = match mode {
        ExtractionMode::Finest => finest_modules(root),
        ExtractionMode::Threshold => threshold_modules(root, coupling_threshold),
    };
    ModulePartition::from_modules(modules)
}

fn finest_modules(root: &DendrogramNode) -> Vec<OrdSet<String>> {
    root.leaves()
        .into_iter()
        .map(|unit| OrdSet::unit(unit.to_string()))
        .collect()
}

fn threshold_modules(root: &DendrogramNode, coupling_threshold: f64) -> Vec<OrdSet<String>> {
    let mut modules = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.children() {
            None => modules.push(node.units()),
            Some((left, right)) => {
                if node.coupling() < coupling_threshold {
                    modules.push(node.units());
                } else {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
    modules
}
