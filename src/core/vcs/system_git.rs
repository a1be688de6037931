//! System git backend
//!
//! Shells out to the `git` binary on PATH. One `rev-parse` to locate the repository, one
//! `diff --name-only -z` per run.

use super::ChangeSource;
use crate::core::error::{AffectedError, AffectedResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Directory git was opened from
  repo_path: PathBuf,

  /// Working tree root
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let output = isolated_git(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| {
        AffectedError::Git(GitError::CommandFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          stderr: e.to_string(),
        })
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(AffectedError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(AffectedError::Git(GitError::CommandFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());
    tracing::debug!("opened git repository at {}", work_tree.display());

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree,
    })
  }

  /// Root of the working tree; diff paths are relative to it.
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  fn git_cmd(&self) -> Command {
    isolated_git(&self.repo_path)
  }
}

/// Create a git command with isolated environment
///
/// - Sets working directory to `dir`
/// - Clears environment variables (GIT_DIR, GIT_WORK_TREE, ... included)
/// - Whitelists only PATH and HOME
fn isolated_git(dir: &Path) -> Command {
  let mut cmd = Command::new("git");

  cmd.arg("-C").arg(dir);

  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }

  cmd
}

impl ChangeSource for SystemGit {
  fn diff(&self, from: &str, to: &str) -> AffectedResult<Vec<String>> {
    tracing::debug!("git diff --name-only --no-renames -z {} {}", from, to);

    // NUL-terminated entries are never C-quoted; revisions can't be read as options
    let output = self
      .git_cmd()
      .args([
        "diff",
        "--name-only",
        "--no-renames",
        "-z",
        "--end-of-options",
        from,
        to,
        "--",
      ])
      .output()
      .context("Failed to execute git diff")?;

    if !output.status.success() {
      return Err(AffectedError::Git(GitError::DiffFailed {
        from: from.to_string(),
        to: to.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    let paths = split_name_only(&String::from_utf8_lossy(&output.stdout));
    tracing::debug!("git diff listed {} entries", paths.len());
    Ok(paths)
  }
}

/// Split `--name-only -z` output into one entry per path, keeping the trailing empty entry.
fn split_name_only(stdout: &str) -> Vec<String> {
  stdout.split('\0').map(str::to_string).collect()
}
