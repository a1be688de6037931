//! CLI commands for affected-tests
//!
//! - **select**: Find modules affected between two revisions and write their tests to a
//!   manifest

pub mod select;

pub use select::{SelectArgs, run_select};
