//! Module dependency graph and affected analysis
//!
//! The graph is declared by hand (or in affected.toml), never inferred from build files.

pub mod affected;
pub mod module_graph;

pub use affected::AffectedAnalysis;
pub use module_graph::ModuleGraph;
