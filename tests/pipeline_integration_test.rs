//! End-to-end tests for the recovery pipeline: normalization through
//! coupling, clustering, and module extraction.

use archmap::{
    build_coupling_matrix, build_dendrogram, identify_modules, identify_modules_with_mode,
    recover_modules, recover_modules_cancellable, CallEdge, CancelFlag, CouplingMatrix,
    ExtractionMode, MethodCallGraph, RecoveryConfig, RecoveryError,
};
use im::OrdMap;
use pretty_assertions::assert_eq;

/// Mutual calls between two units: out(X)=1, inbound from Y=1, so both
/// cells read 2 / (1 + 1 + 1).
#[test]
fn mutual_calls_couple_at_two_thirds() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.X.m1", "app.Y.m2");
    graph.add_call("app.Y.m2", "app.X.m1");

    let result = recover_modules(&graph, &RecoveryConfig::default());

    let expected = 2.0 / 3.0;
    assert!((result.matrix.score("app.X", "app.Y") - expected).abs() < 1e-9);
    assert!((result.matrix.score("app.Y", "app.X") - expected).abs() < 1e-9);

    let root = result.dendrogram.as_ref().unwrap();
    assert_eq!(root.leaf_count(), 2);
    assert_eq!(root.internal_count(), 1);
    assert!((root.coupling() - expected).abs() < 1e-9);
}

/// Three units where only X -> Y exists: coupling(X,Y) = 1/(1+0+1), the
/// zero-coupled Z joins last at 0.0.
#[test]
fn isolated_unit_merges_last_at_zero() {
    let zero_row = |a: &str, b: &str| -> OrdMap<String, f64> {
        OrdMap::from(vec![(a.to_string(), 0.0), (b.to_string(), 0.0)])
    };
    let mut x_row = zero_row("app.Y", "app.Z");
    x_row.insert("app.Y".to_string(), 0.5);
    let mut y_row = zero_row("app.X", "app.Z");
    y_row.insert("app.X".to_string(), 0.5);
    let matrix = CouplingMatrix::from_scores(OrdMap::from(vec![
        ("app.X".to_string(), x_row),
        ("app.Y".to_string(), y_row),
        ("app.Z".to_string(), zero_row("app.X", "app.Y")),
    ]));

    let root = build_dendrogram(&matrix).unwrap();

    assert_eq!(root.coupling(), 0.0);
    let (left, right) = root.children().unwrap();
    let (pair, single) = if left.is_leaf() { (right, left) } else { (left, right) };
    assert_eq!(single.representative(), "app.Z");
    assert!((pair.coupling() - 0.5).abs() < 1e-9);
    assert!(pair.units().contains("app.X"));
    assert!(pair.units().contains("app.Y"));
}

/// Empty call graph: empty matrix, no dendrogram, empty partition.
#[test]
fn empty_call_graph_yields_empty_results() {
    let graph = MethodCallGraph::new();
    let result = recover_modules(&graph, &RecoveryConfig::default());

    assert!(result.matrix.is_empty());
    assert!(result.dendrogram.is_none());
    assert!(result.partition.is_empty());

    assert!(build_dendrogram(&CouplingMatrix::default()).is_none());
    assert!(identify_modules(&CouplingMatrix::default(), 0.02).is_empty());
}

/// A graph of nothing but self-calls normalizes to an empty matrix.
#[test]
fn self_calls_only_yield_empty_matrix() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.X.m1", "app.X.m2");
    graph.add_call("app.X.m2", "app.X.m3");
    graph.add_call("app.Y.a", "app.Y.b");

    let result = recover_modules(&graph, &RecoveryConfig::default());
    assert!(result.matrix.is_empty());
    assert!(result.dendrogram.is_none());
}

#[test]
fn library_and_unresolved_calls_are_dropped_silently() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.X.run", "java.util.List.add");
    graph.add_call("app.X.run", "javax.swing.JFrame.show");
    graph.add_call("app.X.run", "[unresolved].mystery");
    graph.add_call("app.X.run", "app.Outer$Inner.poke");
    graph.add_call("app.X.run", "app.Y.serve");

    let result = recover_modules(&graph, &RecoveryConfig::default());

    assert_eq!(result.matrix.unit_count(), 2);
    assert!(result.matrix.contains_unit("app.X"));
    assert!(result.matrix.contains_unit("app.Y"));
}

/// Two pipeline runs over the same snapshot produce identical trees and
/// partitions.
#[test]
fn recovery_is_deterministic() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.A.m", "app.B.m");
    graph.add_call("app.B.m", "app.C.m");
    graph.add_call("app.C.m", "app.A.m");
    graph.add_call("app.D.m", "app.E.m");
    graph.add_call("app.E.m", "app.D.m");

    let config = RecoveryConfig::default();
    let first = recover_modules(&graph, &config);
    let second = recover_modules(&graph, &config);

    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.dendrogram, second.dendrogram);
    assert_eq!(first.partition, second.partition);
}

#[test]
fn finest_and_threshold_modes_cover_the_same_units() {
    let edges = vec![
        CallEdge::new("app.A", "app.B"),
        CallEdge::new("app.B", "app.A"),
        CallEdge::new("app.C", "app.B"),
    ];
    let matrix = build_coupling_matrix(&edges);

    let finest = identify_modules_with_mode(&matrix, 0.02, ExtractionMode::Finest);
    let threshold = identify_modules(&matrix, 0.02);

    assert_eq!(finest.unit_count(), 3);
    assert_eq!(threshold.unit_count(), 3);
    assert_eq!(finest.len(), 3);
    for unit in ["app.A", "app.B", "app.C"] {
        assert!(finest.contains_unit(unit));
        assert!(threshold.contains_unit(unit));
    }
}

#[test]
fn cancelled_run_reports_cancellation() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.A.m", "app.B.m");

    let cancel = CancelFlag::new();
    cancel.cancel();
    let result = recover_modules_cancellable(&graph, &RecoveryConfig::default(), &cancel);

    assert!(matches!(result, Err(RecoveryError::Cancelled)));
}

#[test]
fn result_serializes_for_renderers() {
    let mut graph = MethodCallGraph::new();
    graph.add_call("app.A.m", "app.B.m");

    let result = recover_modules(&graph, &RecoveryConfig::default());
    let json = serde_json::to_string(&result).unwrap();

    assert!(json.contains("app.A"));
    assert!(json.contains("partition"));
}
