//! Error types for affected-tests with contextual messages and exit codes
//!
//! Every failure aborts the run. A partial test manifest would silently under-test a
//! change, so nothing here is retried or downgraded to a warning.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for affected-tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (invalid args, bad config)
  User = 1,
  /// System error (git, filesystem, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for affected-tests
#[derive(Debug)]
pub enum AffectedError {
  /// Command line misuse (e.g. fewer than two revisions)
  InvalidArguments { message: String },

  /// Configuration errors
  Config(ConfigError),

  /// Version control errors
  Git(GitError),

  /// Walking a module's test tree failed
  Walk {
    module: String,
    path: PathBuf,
    source: walkdir::Error,
  },

  /// A module's test root exists but cannot be inspected
  TestRoot {
    module: String,
    path: PathBuf,
    source: io::Error,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl AffectedError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    AffectedError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  ///
  /// I/O errors are promoted to messages so the context is not lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      AffectedError::Message { message, context, help } => AffectedError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      AffectedError::Io(err) => AffectedError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      AffectedError::InvalidArguments { .. } => ExitCode::User,
      AffectedError::Config(_) => ExitCode::User,
      AffectedError::Git(_) => ExitCode::System,
      AffectedError::Walk { .. } => ExitCode::System,
      AffectedError::TestRoot { .. } => ExitCode::System,
      AffectedError::Io(_) => ExitCode::System,
      AffectedError::Message { .. } => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      AffectedError::InvalidArguments { .. } => {
        Some("Usage: affected-tests <FROM_COMMIT> <TO_COMMIT>. Run with --help for all options.".to_string())
      }
      AffectedError::Config(e) => e.help_message(),
      AffectedError::Git(e) => e.help_message(),
      AffectedError::Walk { module, .. } | AffectedError::TestRoot { module, .. } => Some(format!(
        "Check permissions under '{}', or pass --keep-going to skip unreadable modules.",
        module
      )),
      AffectedError::Message { help, .. } => help.clone(),
      AffectedError::Io(_) => None,
    }
  }
}

impl fmt::Display for AffectedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AffectedError::InvalidArguments { message } => write!(f, "Invalid arguments: {}", message),
      AffectedError::Config(e) => write!(f, "{}", e),
      AffectedError::Git(e) => write!(f, "{}", e),
      AffectedError::Walk { module, path, source } => {
        write!(
          f,
          "Failed to walk tests of module '{}' at {}: {}",
          module,
          path.display(),
          source
        )
      }
      AffectedError::TestRoot { module, path, source } => {
        write!(
          f,
          "Failed to read test root of module '{}' at {}: {}",
          module,
          path.display(),
          source
        )
      }
      AffectedError::Io(e) => write!(f, "I/O error: {}", e),
      AffectedError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for AffectedError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AffectedError::Io(e) => Some(e),
      AffectedError::Walk { source, .. } => Some(source),
      AffectedError::TestRoot { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for AffectedError {
  fn from(err: io::Error) -> Self {
    AffectedError::Io(err)
  }
}

impl From<String> for AffectedError {
  fn from(msg: String) -> Self {
    AffectedError::message(msg)
  }
}

impl From<&str> for AffectedError {
  fn from(msg: &str) -> Self {
    AffectedError::message(msg)
  }
}

impl From<serde_json::Error> for AffectedError {
  fn from(err: serde_json::Error) -> Self {
    AffectedError::message(format!("JSON error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for AffectedError {
  fn from(err: std::path::StripPrefixError) -> Self {
    AffectedError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file is not valid TOML or does not match the schema
  Parse { path: PathBuf, message: String },

  /// Config parsed but a value is unusable
  Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop --config to use affected.toml from the repository root, or the built-in defaults.".to_string())
      }
      ConfigError::Parse { .. } => {
        Some("Expected a [tests] table and [[depends]] entries with `module` and `on` keys.".to_string())
      }
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::Parse { path, message } => {
        write!(f, "Failed to parse config {}:\n{}", path.display(), message)
      }
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid config {}: {}", path.display(), reason)
      }
    }
  }
}

/// Version control errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Diff between two revisions failed (unknown revision, bad range, ...)
  DiffFailed { from: String, to: String, stderr: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run affected-tests from inside a git checkout (looked at: {})",
        path.display()
      )),
      GitError::DiffFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Check that both revisions exist locally. In CI you may need `git fetch --depth=0`.".to_string())
        } else {
          None
        }
      }
      GitError::CommandFailed { .. } => Some("Make sure `git` is installed and on PATH.".to_string()),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::DiffFailed { from, to, stderr } => {
        write!(f, "Failed to diff {}..{}\n{}", from, to, stderr.trim_end())
      }
    }
  }
}

/// Result type alias for affected-tests
pub type AffectedResult<T> = Result<T, AffectedError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<AffectedError>,
{
  fn context(self, ctx: impl Into<String>) -> AffectedResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> AffectedResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &AffectedError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
