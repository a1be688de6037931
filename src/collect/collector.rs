//! Test file discovery
//!
//! Each module keeps its tests under a module-relative test root (`src/test/java` by
//! default). Discovery is a lazy walk of that root; paths come out relative to it, with
//! forward slashes, sorted by file name at every directory level.

use crate::core::error::{AffectedError, AffectedResult};
use crate::utils::path_to_git_format;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default module-relative directory holding test sources.
pub const DEFAULT_TEST_DIR: &str = "src/test/java";

/// Finds test files for modules under a source tree root.
#[derive(Debug, Clone)]
pub struct TestCollector {
  /// Root containing one directory per module
  root: PathBuf,

  /// Test root inside each module directory
  test_dir: PathBuf,
}

impl TestCollector {
  pub fn new(root: impl Into<PathBuf>, test_dir: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      test_dir: test_dir.into(),
    }
  }

  /// Directory walked for `module`'s tests.
  pub fn test_root(&self, module: &str) -> PathBuf {
    self.root.join(module).join(&self.test_dir)
  }

  /// Lazily list `module`'s test files, relative to its test root.
  ///
  /// A module without a test root yields nothing. Each call starts a fresh walk.
  /// A test root that exists but cannot be inspected yields a single error.
  pub fn find_tests(&self, module: &str) -> TestWalk {
    let base = self.test_root(module);
    let mut pending = None;
    let inner = match fs::metadata(&base) {
      Ok(meta) if meta.is_dir() => Some(WalkDir::new(&base).sort_by_file_name().into_iter()),
      Ok(_) => {
        tracing::debug!("test root of {} at {} is not a directory", module, base.display());
        None
      }
      Err(err) if matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
        tracing::debug!("module {} has no test root at {}", module, base.display());
        None
      }
      Err(source) => {
        pending = Some(AffectedError::TestRoot {
          module: module.to_string(),
          path: base.clone(),
          source,
        });
        None
      }
    };

    TestWalk {
      module: module.to_string(),
      base,
      pending,
      inner,
    }
  }
}

/// Iterator over one module's test files.
///
/// Yields an error (and keeps going if polled again) when an entry cannot be read.
pub struct TestWalk {
  module: String,
  base: PathBuf,
  /// Failure to stat the test root, reported before anything else
  pending: Option<AffectedError>,
  inner: Option<walkdir::IntoIter>,
}

impl TestWalk {
  fn relative(&self, path: &Path) -> AffectedResult<String> {
    let relative = path.strip_prefix(&self.base)?;
    Ok(path_to_git_format(relative))
  }
}

impl Iterator for TestWalk {
  type Item = AffectedResult<String>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(err) = self.pending.take() {
      return Some(Err(err));
    }

    loop {
      let entry = match self.inner.as_mut()?.next()? {
        Ok(entry) => entry,
        Err(source) => {
          let path = source.path().map(Path::to_path_buf).unwrap_or_else(|| self.base.clone());
          return Some(Err(AffectedError::Walk {
            module: self.module.clone(),
            path,
            source,
          }));
        }
      };

      if entry.file_type().is_dir() {
        continue;
      }
      // Symlinked directories are neither descended into nor listed
      if entry.path_is_symlink() && entry.path().is_dir() {
        continue;
      }

      return Some(self.relative(entry.path()));
    }
  }
}
