//! Test manifest rendering
//!
//! Format, one block per testable module in name order:
//!
//! ```text
//! # tests for runelite-api
//! net/runelite/api/VarbitTest.java
//! # tests for runelite-client
//! net/runelite/client/ClientTest.java
//! ```
//!
//! The whole manifest is rendered in memory before anything touches disk, so a failed
//! walk never leaves a truncated `tests.txt` behind.

use super::collector::TestCollector;
use crate::core::error::{AffectedError, AffectedResult, ResultExt};
use crate::ui::progress::ModuleProgress;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Rendered manifest plus what went into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  text: String,

  /// Total test paths listed
  pub tests: usize,

  /// Modules left out because their test tree could not be walked
  pub skipped: Vec<String>,
}

impl Manifest {
  /// Render the manifest for `modules`.
  ///
  /// With `keep_going`, a module whose walk fails is dropped (no header) and recorded in
  /// `skipped`; otherwise the first walk error aborts rendering.
  pub fn render(
    modules: &BTreeSet<String>,
    collector: &TestCollector,
    keep_going: bool,
    mut progress: Option<&mut ModuleProgress>,
  ) -> AffectedResult<Self> {
    let mut manifest = Manifest::default();

    for module in modules {
      let tests = match collector.find_tests(module).collect::<AffectedResult<Vec<_>>>() {
        Ok(tests) => tests,
        Err(err @ (AffectedError::Walk { .. } | AffectedError::TestRoot { .. })) if keep_going => {
          tracing::warn!("skipping module {}: {}", module, err);
          manifest.skipped.push(module.clone());
          if let Some(progress) = progress.as_deref_mut() {
            progress.inc();
          }
          continue;
        }
        Err(err) => return Err(err),
      };

      tracing::debug!("module {}: {} tests", module, tests.len());
      manifest.push_module(module, &tests);

      if let Some(progress) = progress.as_deref_mut() {
        progress.inc();
      }
    }

    Ok(manifest)
  }

  fn push_module(&mut self, module: &str, tests: &[String]) {
    self.text.push_str("# tests for ");
    self.text.push_str(module);
    self.text.push('\n');
    for test in tests {
      self.text.push_str(test);
      self.text.push('\n');
    }
    self.tests += tests.len();
  }

  /// Manifest file contents.
  pub fn as_str(&self) -> &str {
    &self.text
  }

  /// Overwrite `path` with the manifest.
  pub fn write_to(&self, path: &Path) -> AffectedResult<()> {
    fs::write(path, self.as_str()).with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    tracing::debug!("wrote {} bytes to {}", self.text.len(), path.display());
    Ok(())
  }
}
