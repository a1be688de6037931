//! Declared module dependency graph built on petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B", so a change to B retests A
//! - **Nodes**: Module names (top-level directories)
//! - **Edges**: One per declaration; redeclaring an edge adds a parallel edge
//! - **Index**: Module name → node index
//!
//! Modules never declared are implicitly leaves: their closure is just themselves.

use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Static reverse-dependency graph between modules.
///
/// Built once via [`ModuleGraph::declare`], then only queried.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
  graph: DiGraph<String, ()>,
  name_to_node: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// The module relationships of the RuneLite build.
  pub fn builtin() -> Self {
    let mut graph = Self::new();
    graph.declare(
      "runelite-client",
      &["runelite-api", "runelite-jshell", "runelite-script-assembler-plugin"],
    );
    graph.declare("runelite-script-assembler-plugin", &["cache"]);
    graph.declare("cache-client", &["cache"]);
    graph.declare("cache-updater", &["cache-client"]);
    graph
  }

  /// Register that `dependent` must be retested whenever any of `dependencies` changes.
  pub fn declare<S: AsRef<str>>(&mut self, dependent: &str, dependencies: &[S]) {
    let dependent_idx = self.node(dependent);
    for dependency in dependencies {
      let dependency_idx = self.node(dependency.as_ref());
      self.graph.add_edge(dependent_idx, dependency_idx, ());
    }
  }

  /// All declared module names, sorted.
  pub fn modules(&self) -> Vec<String> {
    let mut modules: Vec<_> = self.name_to_node.keys().cloned().collect();
    modules.sort();
    modules
  }

  /// Number of declarations (duplicates included).
  pub fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Modules declared as depending on `module`, in declaration order.
  ///
  /// Duplicate declarations show up as duplicate entries.
  pub fn direct_dependents(&self, module: &str) -> Vec<String> {
    let Some(&node_idx) = self.name_to_node.get(module) else {
      return Vec::new();
    };

    // petgraph lists the most recently added edge first
    let mut dependents: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, Direction::Incoming)
      .map(|idx| self.graph[idx].clone())
      .collect();
    dependents.reverse();
    dependents
  }

  /// Every module that must be retested when `module` changes, `module` first.
  ///
  /// Explicit-stack DFS over incoming edges with a visited set, so duplicate edges and
  /// cycles are each visited once.
  pub fn closure(&self, module: &str) -> Vec<String> {
    let Some(&start) = self.name_to_node.get(module) else {
      return vec![module.to_string()];
    };

    let mut visited = HashSet::new();
    let mut stack = vec![start];
    let mut reached = Vec::new();

    while let Some(node_idx) = stack.pop() {
      if !visited.insert(node_idx) {
        continue;
      }
      reached.push(self.graph[node_idx].clone());

      for neighbor_idx in self.graph.neighbors_directed(node_idx, Direction::Incoming) {
        if !visited.contains(&neighbor_idx) {
          stack.push(neighbor_idx);
        }
      }
    }

    reached
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns each strongly connected component with more than one module, names sorted.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| self.graph[idx].clone()).collect();
        names.sort();
        names
      })
      .collect();
    cycles.sort();
    cycles
  }

  fn node(&mut self, name: &str) -> NodeIndex {
    if let Some(&idx) = self.name_to_node.get(name) {
      return idx;
    }
    let idx = self.graph.add_node(name.to_string());
    self.name_to_node.insert(name.to_string(), idx);
    idx
  }
}
