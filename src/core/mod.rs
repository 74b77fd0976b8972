//! Core data types shared across the recovery pipeline.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel prefix the parsing front end uses for call targets it could not
/// bind to a declaration. Edges carrying it are dropped during normalization.
pub const UNRESOLVED_PREFIX: &str = "[unresolved].";

/// Raw method-level call graph, as produced by an external parsing front end.
///
/// Maps a fully qualified method id (`package.Class.method`) to the ordered
/// list of fully qualified callee ids. Stored in a `BTreeMap` so every
/// downstream stage iterates callers in a canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCallGraph {
    calls: BTreeMap<String, Vec<String>>,
}

impl MethodCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(calls: BTreeMap<String, Vec<String>>) -> Self {
        Self { calls }
    }

    /// Record a call from `caller` to `callee`. Registers the caller if it
    /// has not been seen before.
    pub fn add_call(&mut self, caller: impl Into<String>, callee: impl Into<String>) {
        self.calls
            .entry(caller.into())
            .or_default()
            .push(callee.into());
    }

    /// Register a method with no outgoing calls.
    pub fn add_method(&mut self, method: impl Into<String>) {
        self.calls.entry(method.into()).or_default();
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    /// All (caller, callee) method pairs in caller order.
    pub fn calls(&self) -> impl Iterator<Item = (&str, &str)> {
        self.calls
            .iter()
            .flat_map(|(caller, callees)| callees.iter().map(move |c| (caller.as_str(), c.as_str())))
    }

    pub fn method_count(&self) -> usize {
        self.calls.len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// A single class-granularity call edge derived from the method graph.
/// Transient: rebuilt on every analysis run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller_unit: String,
    pub callee_unit: String,
}

impl CallEdge {
    pub fn new(caller_unit: impl Into<String>, callee_unit: impl Into<String>) -> Self {
        Self {
            caller_unit: caller_unit.into(),
            callee_unit: callee_unit.into(),
        }
    }
}

/// A disjoint, covering grouping of units read off the dendrogram.
///
/// Modules are sorted by their smallest member id so the same tree always
/// yields the same output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulePartition {
    modules: Vec<OrdSet<String>>,
}

impl ModulePartition {
    pub(crate) fn from_modules(mut modules: Vec<OrdSet<String>>) -> Self {
        modules.sort_by(|a, b| a.get_min().cmp(&b.get_min()));
        Self { modules }
    }

    pub fn modules(&self) -> &[OrdSet<String>] {
        &self.modules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrdSet<String>> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of units across all modules.
    pub fn unit_count(&self) -> usize {
        self.modules.iter().map(OrdSet::len).sum()
    }

    pub fn contains_unit(&self, unit: &str) -> bool {
        self.modules.iter().any(|m| m.contains(unit))
    }
}

impl<'a> IntoIterator for &'a ModulePartition {
    type Item = &'a OrdSet<String>;
    type IntoIter = std::slice::Iter<'a, OrdSet<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}
