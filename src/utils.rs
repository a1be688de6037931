//! Utility functions for cross-platform path handling

use std::path::Path;

/// Convert a path to manifest format (always forward slashes)
///
/// Test runners consume the manifest on every platform, so separators are normalized.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
