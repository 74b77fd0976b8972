//! Call-graph normalization: method-level edges down to unit (class) level.
//!
//! The parsing front end reports calls between fully qualified methods. This
//! stage strips the member segment to recover the owning unit, then filters
//! out edges the coupling analysis must not count:
//! - callees the parser flagged with the `[unresolved].` sentinel
//! - units in excluded namespaces (standard-library-style prefixes)
//! - nested types (ids containing `$`)
//! - self-edges (caller unit == callee unit)
//!
//! Malformed ids without a dot are dropped silently; normalization never
//! fails.

use crate::core::{CallEdge, MethodCallGraph, UNRESOLVED_PREFIX};

/// Namespace prefixes excluded from coupling analysis by default.
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] = &["java.", "javax.", "sun.", "com.sun.", "org."];

/// Derive the owning unit id from a fully qualified method id by stripping
/// the trailing member segment. Returns `None` for ids without a dot.
pub fn owning_unit(method_id: &str) -> Option<&str> {
    method_id.rsplit_once('.').map(|(unit, _)| unit)
}

fn is_excluded(unit: &str, excluded_namespaces: &[String]) -> bool {
    unit.contains('$') || excluded_namespaces.iter().any(|ns| unit.starts_with(ns))
}

/// Reduce a method-level call graph to unit-level call edges.
///
/// The input snapshot is read only; edge order follows the graph's canonical
/// caller order, so repeated runs over the same snapshot produce the same
/// sequence.
pub fn normalize_call_graph(
    graph: &MethodCallGraph,
    excluded_namespaces: &[String],
) -> Vec<CallEdge> {
    let mut edges = Vec::new();
    let mut dropped = 0usize;

    for (caller, callee) in graph.calls() {
        if callee.starts_with(UNRESOLVED_PREFIX) {
            dropped += 1;
            continue;
        }
        let (Some(caller_unit), Some(callee_unit)) = (owning_unit(caller), owning_unit(callee))
        else {
            dropped += 1;
            continue;
        };
        if caller_unit == callee_unit
            || is_excluded(caller_unit, excluded_namespaces)
            || is_excluded(callee_unit, excluded_namespaces)
        {
            dropped += 1;
            continue;
        }
        edges.push(CallEdge::new(caller_unit, callee_unit));
    }

    log::debug!(
        "Normalized call graph: {} unit edges retained, {} calls dropped",
        edges.len(),
        dropped
    );
    edges
}
