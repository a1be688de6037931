//! Test discovery and manifest output

pub mod collector;
pub mod manifest;

pub use collector::{DEFAULT_TEST_DIR, TestCollector};
pub use manifest::Manifest;
