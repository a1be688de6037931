use crate::collect::DEFAULT_TEST_DIR;
use crate::core::error::{AffectedError, AffectedResult, ConfigError};
use crate::graph::ModuleGraph;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for affected-tests
/// Searched in order: affected.toml, .affected.toml, .config/affected.toml
///
/// Every field is optional; an absent file means the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AffectedConfig {
  #[serde(default)]
  pub tests: TestsConfig,
  /// Replaces the built-in graph when non-empty
  #[serde(default)]
  pub depends: Vec<DependsConfig>,
}

/// Where tests live and where the manifest goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestsConfig {
  /// Module-relative test root (default: "src/test/java")
  #[serde(default = "default_test_dir")]
  pub dir: PathBuf,

  /// Manifest path, relative to the working directory (default: "tests.txt")
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,
}

fn default_test_dir() -> PathBuf {
  PathBuf::from(DEFAULT_TEST_DIR)
}

fn default_manifest() -> PathBuf {
  PathBuf::from("tests.txt")
}

impl Default for TestsConfig {
  fn default() -> Self {
    Self {
      dir: default_test_dir(),
      manifest: default_manifest(),
    }
  }
}

/// One declaration: `module` is retested when anything in `on` changes
///
/// # Example
///
/// ```toml
/// [[depends]]
/// module = "runelite-client"
/// on = ["runelite-api", "runelite-jshell"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependsConfig {
  pub module: String,
  pub on: Vec<String>,
}

impl AffectedConfig {
  /// Find config file in search order: affected.toml, .affected.toml, .config/affected.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("affected.toml"),
      path.join(".affected.toml"),
      path.join(".config").join("affected.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from `explicit` if given, else search `root`, else use defaults.
  pub fn resolve(root: &Path, explicit: Option<&Path>) -> AffectedResult<Self> {
    let path = match explicit {
      Some(path) if !path.is_file() => {
        return Err(AffectedError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(root) {
        Some(path) => path,
        None => {
          tracing::debug!("no config found under {}, using defaults", root.display());
          return Ok(Self::default());
        }
      },
    };

    tracing::debug!("loading config from {}", path.display());
    Self::load_from(&path)
  }

  /// Load and validate a specific config file
  pub fn load_from(path: &Path) -> AffectedResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| {
      AffectedError::Config(ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
      })
    })?;
    Self::parse(path, &content)
  }

  fn parse(path: &Path, content: &str) -> AffectedResult<Self> {
    let config: AffectedConfig = toml_edit::de::from_str(content).map_err(|e| {
      AffectedError::Config(ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
      })
    })?;

    config.validate().map_err(|reason| {
      AffectedError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
      })
    })?;

    Ok(config)
  }

  /// Validate configuration values
  fn validate(&self) -> Result<(), String> {
    if self.tests.dir.is_absolute() {
      return Err(format!(
        "tests.dir must be relative to each module, got '{}'",
        self.tests.dir.display()
      ));
    }
    if self.tests.manifest.as_os_str().is_empty() {
      return Err("tests.manifest must not be empty".to_string());
    }

    for (i, depends) in self.depends.iter().enumerate() {
      if depends.module.trim().is_empty() {
        return Err(format!("depends[{}].module must not be empty", i));
      }
      if depends.on.is_empty() {
        return Err(format!("depends[{}] ('{}') lists no modules in `on`", i, depends.module));
      }
      if depends.on.iter().any(|m| m.trim().is_empty()) {
        return Err(format!("depends[{}] ('{}') has an empty name in `on`", i, depends.module));
      }
    }

    Ok(())
  }

  /// Dependency graph for this configuration
  ///
  /// Declared `[[depends]]` entries replace the built-in graph; none means built-in.
  pub fn module_graph(&self) -> ModuleGraph {
    if self.depends.is_empty() {
      return ModuleGraph::builtin();
    }

    let mut graph = ModuleGraph::new();
    for depends in &self.depends {
      graph.declare(&depends.module, depends.on.as_slice());
    }
    graph
  }
}
