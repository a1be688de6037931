//! Core building blocks for affected-tests
//!
//! - **config**: Optional affected.toml parsing and validation
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Change listing between revisions (SystemGit)

pub mod config;
pub mod error;
pub mod vcs;
