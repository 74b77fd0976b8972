//! Bottom-up recovery of architectural modules from a coupling matrix.
//!
//! Average-linkage hierarchical agglomerative clustering merges units into
//! a full binary dendrogram; module extraction then reads a disjoint
//! partition off the tree, either one-unit-per-module or cut by a coupling
//! threshold.

mod dendrogram;
mod extraction;
mod hierarchical;

pub use dendrogram::DendrogramNode;
pub use extraction::{
    extract_partition, identify_modules, identify_modules_with_mode, ExtractionMode,
};
pub use hierarchical::{build_dendrogram, build_dendrogram_cancellable};
