//! Affected module analysis
//!
//! Given two revisions, determine:
//! - Which top-level modules directly contain changed files
//! - Which modules must be retested (closure over the declared graph)

use super::module_graph::ModuleGraph;
use crate::core::error::AffectedResult;
use crate::core::vcs::ChangeSource;
use std::collections::BTreeSet;

/// Modules touched between two revisions, and everything they force to be retested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedAnalysis {
  /// Modules containing at least one changed file
  pub modified: BTreeSet<String>,

  /// Union of the closures of every modified module
  pub testable: BTreeSet<String>,
}

impl AffectedAnalysis {
  pub fn is_empty(&self) -> bool {
    self.testable.is_empty()
  }
}

/// Top-level module owning a repository-relative path.
///
/// Root-level files and blank entries belong to no module.
pub fn module_of(path: &str) -> Option<&str> {
  match path.split_once('/') {
    Some((head, _)) if !head.is_empty() => Some(head),
    _ => None,
  }
}

/// Set of modules with at least one file differing between `from` and `to`.
pub fn find_modified_modules(source: &impl ChangeSource, from: &str, to: &str) -> AffectedResult<BTreeSet<String>> {
  let paths = source.diff(from, to)?;

  let modified: BTreeSet<String> = paths.iter().filter_map(|p| module_of(p)).map(str::to_string).collect();

  tracing::debug!(
    "{} changed paths map to {} modules between {} and {}",
    paths.iter().filter(|p| !p.is_empty()).count(),
    modified.len(),
    from,
    to
  );
  Ok(modified)
}

/// Union the closures of every modified module.
pub fn testable_modules(graph: &ModuleGraph, modified: &BTreeSet<String>) -> BTreeSet<String> {
  let mut testable = BTreeSet::new();
  for module in modified {
    tracing::trace!("{} is depended on by {:?}", module, graph.direct_dependents(module));
    let closure = graph.closure(module);
    tracing::trace!("closure of {}: {:?}", module, closure);
    testable.extend(closure);
  }
  testable
}

/// Run change detection and closure in one step.
pub fn analyze(source: &impl ChangeSource, graph: &ModuleGraph, from: &str, to: &str) -> AffectedResult<AffectedAnalysis> {
  let modified = find_modified_modules(source, from, to)?;
  let testable = testable_modules(graph, &modified);
  Ok(AffectedAnalysis { modified, testable })
}
