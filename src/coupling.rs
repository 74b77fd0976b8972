//! Coupling matrix construction.
//!
//! Aggregates unit-level call edges into a symmetric matrix of coupling
//! scores in `[0, 1)`. For an unordered pair `{a, b}` taken in canonical
//! orientation (lexicographically smaller id as `a`):
//!
//! ```text
//! links(a, b)    = count(a -> b) + count(b -> a)
//! coupling(a, b) = links(a, b) / (out(a) + count(b -> a) + 1)
//! ```
//!
//! where `out(a)` is the total number of retained calls leaving `a`. The
//! score is written into both cells, so symmetry holds by construction.
//! Every pair of retained units gets an explicit entry, zero included; the
//! clustering stage reads zeros directly rather than treating absence as a
//! special case. The `+1` term keeps the denominator nonzero.

use crate::core::CallEdge;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Symmetric unit-to-unit coupling scores. Immutable once built; rebuilt
/// from scratch on every analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouplingMatrix {
    scores: OrdMap<String, OrdMap<String, f64>>,
}

impl CouplingMatrix {
    /// Assemble a matrix from explicit rows. The caller is responsible for
    /// symmetry and explicit zero cells; [`build_coupling_matrix`] is the
    /// normal construction path.
    pub fn from_scores(scores: OrdMap<String, OrdMap<String, f64>>) -> Self {
        Self { scores }
    }

    /// Unit ids in sorted order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn unit_count(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn contains_unit(&self, unit: &str) -> bool {
        self.scores.contains_key(unit)
    }

    /// Coupling score between two units; 0.0 when either is unknown.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.scores
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Fixed-width table of all scores, sorted by unit id, `-` on the
    /// diagonal. Debug aid for callers; mirrors nothing persistent.
    pub fn render_table(&self) -> String {
        let units: Vec<&str> = self.units().collect();
        let width = units
            .iter()
            .map(|u| short_name(u).len())
            .max()
            .unwrap_or(0)
            .max(8)
            + 2;

        let mut out = String::new();
        let _ = write!(out, "{:width$}", "");
        for unit in &units {
            let _ = write!(out, "{:>width$}", short_name(unit));
        }
        out.push('\n');
        for row in &units {
            let _ = write!(out, "{:width$}", short_name(row));
            for col in &units {
                if row == col {
                    let _ = write!(out, "{:>width$}", "-");
                } else {
                    let _ = write!(out, "{:>width$.3}", self.score(row, col));
                }
            }
            out.push('\n');
        }
        out
    }
}

fn short_name(unit: &str) -> &str {
    unit.rsplit_once('.').map_or(unit, |(_, name)| name)
}

/// Build the coupling matrix from normalized call edges.
///
/// An empty edge sequence yields an empty matrix. Units with zero retained
/// edges never appear; self entries are never produced.
pub fn build_coupling_matrix(edges: &[CallEdge]) -> CouplingMatrix {
    let mut counts: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    let mut units: BTreeSet<&str> = BTreeSet::new();

    for edge in edges {
        units.insert(&edge.caller_unit);
        units.insert(&edge.callee_unit);
        *counts
            .entry(&edge.caller_unit)
            .or_default()
            .entry(&edge.callee_unit)
            .or_insert(0) += 1;
    }

    let directed = |from: &str, to: &str| -> u64 {
        counts.get(from).and_then(|row| row.get(to)).copied().unwrap_or(0)
    };
    let out_total = |unit: &str| -> u64 {
        counts.get(unit).map_or(0, |row| row.values().sum())
    };

    let mut scores: OrdMap<String, OrdMap<String, f64>> = OrdMap::new();
    for unit in &units {
        scores.insert((*unit).to_string(), OrdMap::new());
    }

    let ordered: Vec<&str> = units.iter().copied().collect();
    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            let inbound = directed(b, a);
            let links = directed(a, b) + inbound;
            let score = if links > 0 {
                links as f64 / (out_total(a) + inbound + 1) as f64
            } else {
                0.0
            };
            if let Some(row) = scores.get_mut(*a) {
                row.insert((*b).to_string(), score);
            }
            if let Some(row) = scores.get_mut(*b) {
                row.insert((*a).to_string(), score);
            }
        }
    }

    log::debug!(
        "Built coupling matrix: {} units from {} edges",
        ordered.len(),
        edges.len()
    );
    CouplingMatrix { scores }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edge(a: &str, b: &str) -> CallEdge {
        CallEdge::new(a, b)
    }

    #[test]
    fn test_empty_edges_yield_empty_matrix() {
        let matrix = build_coupling_matrix(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.unit_count(), 0);
    }

    #[test]
    fn test_mutual_calls() {
        // out(X)=1, inbound from Y=1 -> 2 / (1 + 1 + 1)
        let matrix = build_coupling_matrix(&[edge("p.X", "p.Y"), edge("p.Y", "p.X")]);

        assert_eq!(matrix.unit_count(), 2);
        let expected = 2.0 / 3.0;
        assert!((matrix.score("p.X", "p.Y") - expected).abs() < 1e-9);
        assert!((matrix.score("p.Y", "p.X") - expected).abs() < 1e-9);
    }

    #[test]
    fn test_one_directed_call() {
        let matrix = build_coupling_matrix(&[edge("p.X", "p.Y")]);

        // links=1, out(X)=1, inbound from Y=0 -> 1 / (1 + 0 + 1)
        assert!((matrix.score("p.X", "p.Y") - 0.5).abs() < 1e-9);
        assert!((matrix.score("p.Y", "p.X") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_zero_for_unconnected_pair() {
        let matrix = build_coupling_matrix(&[edge("p.X", "p.Y"), edge("p.Y", "p.Z")]);

        assert_eq!(matrix.unit_count(), 3);
        assert_eq!(matrix.score("p.X", "p.Z"), 0.0);
        assert_eq!(matrix.score("p.Z", "p.X"), 0.0);
    }

    #[test]
    fn test_symmetric_under_skewed_fanout() {
        // X calls B once and C five times. The raw formula would give
        // different denominators per orientation; the canonical-orientation
        // build must still produce one shared score per pair.
        let edges = vec![
            edge("p.X", "p.B"),
            edge("p.X", "p.C"),
            edge("p.X", "p.C"),
            edge("p.X", "p.C"),
            edge("p.X", "p.C"),
            edge("p.X", "p.C"),
        ];
        let matrix = build_coupling_matrix(&edges);

        for a in matrix.units() {
            for b in matrix.units() {
                assert_eq!(matrix.score(a, b), matrix.score(b, a));
            }
        }
        // Canonical orientation for {p.B, p.X} is a=p.B: out(B)=0, inbound
        // from X=1 -> 1 / (0 + 1 + 1).
        assert!((matrix.score("p.X", "p.B") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_self_entries() {
        let matrix = build_coupling_matrix(&[edge("p.X", "p.Y")]);
        assert_eq!(matrix.score("p.X", "p.X"), 0.0);
        // The diagonal reads 0.0 only because the cell is absent.
        assert!(matrix.contains_unit("p.X"));
    }

    #[test]
    fn test_scores_stay_below_one() {
        let edges = vec![edge("p.X", "p.Y"), edge("p.Y", "p.X"), edge("p.X", "p.Y")];
        let matrix = build_coupling_matrix(&edges);
        assert!(matrix.score("p.X", "p.Y") < 1.0);
        assert!(matrix.score("p.X", "p.Y") > 0.0);
    }

    #[test]
    fn test_render_table_layout() {
        let matrix = build_coupling_matrix(&[edge("p.X", "p.Y")]);
        let table = matrix.render_table();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains('X'));
        assert!(lines[1].contains('-'));
        assert!(lines[1].contains("0.500"));
    }
}
