//! Architectural module recovery from method-level call graphs.
//!
//! The pipeline turns a raw call graph (produced by an external parsing
//! front end) into candidate architectural modules:
//!
//! 1. [`graph`] normalizes method-level calls down to unit (class) level,
//!    dropping unresolved targets, excluded namespaces, and self-edges.
//! 2. [`coupling`] aggregates the edges into a symmetric coupling matrix
//!    with scores in `[0, 1)`.
//! 3. [`clustering`] runs average-linkage hierarchical clustering to a full
//!    dendrogram and cuts it into a module partition.
//!
//! [`analysis::recover_modules`] runs the whole pipeline over an immutable
//! snapshot; the individual stages are public for callers that render
//! intermediate results (coupling graphs, dendrograms).

pub mod analysis;
pub mod clustering;
pub mod config;
pub mod core;
pub mod coupling;
pub mod graph;

// Re-export commonly used types
pub use crate::analysis::{
    recover_modules, recover_modules_cancellable, CancelFlag, RecoveryError, RecoveryResult,
};
pub use crate::clustering::{
    build_dendrogram, build_dendrogram_cancellable, extract_partition, identify_modules,
    identify_modules_with_mode, DendrogramNode, ExtractionMode,
};
pub use crate::config::RecoveryConfig;
pub use crate::core::{CallEdge, MethodCallGraph, ModulePartition, UNRESOLVED_PREFIX};
pub use crate::coupling::{build_coupling_matrix, CouplingMatrix};
pub use crate::graph::{normalize_call_graph, owning_unit, DEFAULT_EXCLUDED_NAMESPACES};
