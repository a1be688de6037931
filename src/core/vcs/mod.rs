pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::AffectedResult;

/// Source of changed paths between two revisions.
///
/// The narrow seam between change detection and version control, so detection can run
/// against a canned list in tests.
pub trait ChangeSource {
  /// Repository-relative paths that differ between `from` and `to`, one entry per line of
  /// the underlying listing. Entries may be empty.
  fn diff(&self, from: &str, to: &str) -> AffectedResult<Vec<String>>;
}
