//! Average-linkage hierarchical agglomerative clustering.
//!
//! Runs to completion: every round merges the pair of clusters with the
//! highest average coupling until a single root remains. Each round rescans
//! all current pairs, so the loop is O(n^3) for n initial units. That is
//! fine for the expected scale of hundreds of units and does not scale to
//! tens of thousands; callers with large inputs should run it off their
//! main thread and pass a cancel flag.
//!
//! Determinism: clusters are seeded in sorted unit-id order, and ties on
//! the best average coupling resolve to the pair whose smallest-unit-id
//! representatives compare lexicographically smallest. Two runs over the
//! same matrix produce identical trees.

use super::dendrogram::DendrogramNode;
use crate::analysis::{CancelFlag, RecoveryError};
use crate::coupling::CouplingMatrix;

/// Bookkeeping for one active cluster during the merge loop. Members are
/// kept as a sorted vector so the average-coupling scan and the tie-break
/// never depend on hash order.
struct ActiveCluster {
    node: DendrogramNode,
    members: Vec<String>,
}

impl ActiveCluster {
    fn seed(unit: &str) -> Self {
        Self {
            node: DendrogramNode::leaf(unit),
            members: vec![unit.to_string()],
        }
    }

    fn representative(&self) -> &str {
        &self.members[0]
    }
}

/// Mean coupling over the full cross product of two clusters' members.
/// Pairs absent from the matrix read as 0.0 and still count toward the
/// divisor, dragging the average down.
fn average_coupling(a: &ActiveCluster, b: &ActiveCluster, matrix: &CouplingMatrix) -> f64 {
    let pairs = a.members.len() * b.members.len();
    if pairs == 0 {
        return 0.0;
    }
    let mut sum = 0.0;
    for x in &a.members {
        for y in &b.members {
            sum += matrix.score(x, y);
        }
    }
    sum / pairs as f64
}

fn find_best_pair(clusters: &[ActiveCluster], matrix: &CouplingMatrix) -> (usize, usize, f64) {
    let mut best = f64::NEG_INFINITY;
    let (mut best_i, mut best_j) = (0, 1);
    for i in 0..clusters.len() {
        for j in (i + 1)..clusters.len() {
            let avg = average_coupling(&clusters[i], &clusters[j], matrix);
            let wins = if avg > best {
                true
            } else if avg == best {
                let candidate = (
                    clusters[i].representative(),
                    clusters[j].representative(),
                );
                let current = (
                    clusters[best_i].representative(),
                    clusters[best_j].representative(),
                );
                candidate < current
            } else {
                false
            };
            if wins {
                best = avg;
                best_i = i;
                best_j = j;
            }
        }
    }
    (best_i, best_j, best)
}

/// Build the full dendrogram for a coupling matrix. Returns `None` for an
/// empty matrix.
pub fn build_dendrogram(matrix: &CouplingMatrix) -> Option<DendrogramNode> {
    // A fresh flag is never set, so the cancellable path cannot fail here.
    build_dendrogram_cancellable(matrix, &CancelFlag::new()).unwrap_or(None)
}

/// Cancellable variant of [`build_dendrogram`]. The flag is checked once
/// per merge round; a cancelled run surfaces [`RecoveryError::Cancelled`]
/// and discards all partial state.
pub fn build_dendrogram_cancellable(
    matrix: &CouplingMatrix,
    cancel: &CancelFlag,
) -> Result<Option<DendrogramNode>, RecoveryError> {
    let mut clusters: Vec<ActiveCluster> = matrix.units().map(ActiveCluster::seed).collect();
    if clusters.is_empty() {
        return Ok(None);
    }

    let rounds = clusters.len() - 1;
    let mut round = 0usize;
    while clusters.len() > 1 {
        if cancel.is_cancelled() {
            return Err(RecoveryError::Cancelled);
        }

        let (i, j, coupling) = find_best_pair(&clusters, matrix);
        round += 1;
        log::trace!(
            "Merge round {}/{}: {} + {} at coupling {:.3}",
            round,
            rounds,
            clusters[i].representative(),
            clusters[j].representative(),
            coupling
        );

        // i < j always; remove j first so i stays valid.
        let right = clusters.remove(j);
        let left = clusters.remove(i);
        let mut members = left.members;
        members.extend(right.members);
        members.sort();
        let node = DendrogramNode::merge(left.node, right.node, coupling);
        clusters.insert(i, ActiveCluster { node, members });
    }

    let root = clusters.pop().map(|c| c.node);
    if let Some(ref root) = root {
        log::debug!(
            "Built dendrogram: {} leaves, {} merges",
            root.leaf_count(),
            root.internal_count()
        );
    }
    Ok(root)
}
