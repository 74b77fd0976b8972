//! The end-to-end recovery pipeline: normalize, build the coupling matrix,
//! cluster, extract modules.
//!
//! Each invocation reads an immutable snapshot of the caller's method call
//! graph and produces an independent [`RecoveryResult`]; nothing is shared
//! or mutated, so concurrent analyses only need separate result values.
//! The clustering loop is O(n^3) in the number of units, so callers with
//! large inputs should run the pipeline off their main thread and hand it a
//! [`CancelFlag`].

use crate::clustering::{build_dendrogram_cancellable, extract_partition, DendrogramNode};
use crate::config::RecoveryConfig;
use crate::core::{MethodCallGraph, ModulePartition};
use crate::coupling::{build_coupling_matrix, CouplingMatrix};
use crate::graph::normalize_call_graph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by the recovery pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("module recovery cancelled")]
    Cancelled,
}

/// Shared cancellation handle. Clone it into the worker running the
/// pipeline and call [`CancelFlag::cancel`] from anywhere else; the merge
/// loop checks the flag once per round.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Complete output of one analysis run. Built fresh per invocation and
/// immutable thereafter; discarded when a new analysis is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub timestamp: DateTime<Utc>,
    pub matrix: CouplingMatrix,
    pub dendrogram: Option<DendrogramNode>,
    pub partition: ModulePartition,
}

/// Run the full pipeline over a call-graph snapshot.
///
/// Degenerate input is a normal case: an empty graph (or one whose every
/// call is filtered out) yields an empty matrix, no dendrogram, and an
/// empty partition.
pub fn recover_modules(graph: &MethodCallGraph, config: &RecoveryConfig) -> RecoveryResult {
    // A fresh flag is never set, so the cancellable path cannot fail here.
    recover_modules_cancellable(graph, config, &CancelFlag::new())
        .unwrap_or_else(|_| empty_result())
}

/// Cancellable variant of [`recover_modules`].
pub fn recover_modules_cancellable(
    graph: &MethodCallGraph,
    config: &RecoveryConfig,
    cancel: &CancelFlag,
) -> Result<RecoveryResult, RecoveryError> {
    log::info!(
        "Recovering modules from {} methods, {} calls",
        graph.method_count(),
        graph.call_count()
    );

    let edges = normalize_call_graph(graph, &config.excluded_namespaces);
    let matrix = build_coupling_matrix(&edges);
    let dendrogram = build_dendrogram_cancellable(&matrix, cancel)?;
    let partition = match &dendrogram {
        Some(root) => extract_partition(root, config.coupling_threshold, config.mode),
        None => ModulePartition::default(),
    };

    log::info!(
        "Recovered {} modules over {} units",
        partition.len(),
        matrix.unit_count()
    );
    Ok(RecoveryResult {
        timestamp: Utc::now(),
        matrix,
        dendrogram,
        partition,
    })
}

fn empty_result() -> RecoveryResult {
    RecoveryResult {
        timestamp: Utc::now(),
        matrix: CouplingMatrix::default(),
        dendrogram: None,
        partition: ModulePartition::default(),
    }
}
