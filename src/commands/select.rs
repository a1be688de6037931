//! `affected-tests <FROM> <TO>` - Write the tests affected by a change
//!
//! This command:
//! - Lists the top-level modules changed between two revisions (via git)
//! - Expands them through the declared dependency graph
//! - Writes every test file of the resulting modules to a manifest (tests.txt)

use crate::collect::{Manifest, TestCollector};
use crate::core::config::AffectedConfig;
use crate::core::error::{AffectedError, AffectedResult, ResultExt};
use crate::core::vcs::{ChangeSource, SystemGit};
use crate::graph::{AffectedAnalysis, ModuleGraph, affected};
use crate::ui::progress::ModuleProgress;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
  Text,
  Json,
}

impl OutputFormat {
  fn parse(s: &str) -> AffectedResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      _ => Err(AffectedError::InvalidArguments {
        message: format!("Unknown format '{}'. Valid formats: text, json", s),
      }),
    }
  }
}

/// Arguments of one selection run
#[derive(Debug, Clone)]
pub struct SelectArgs {
  pub from: String,
  pub to: String,
  pub output: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub format: String,
  pub dry_run: bool,
  pub keep_going: bool,
}

/// Outcome of one run, as reported to the operator
#[derive(Debug, Serialize)]
struct Report<'a> {
  from: &'a str,
  to: &'a str,
  modified: &'a BTreeSet<String>,
  testable: &'a BTreeSet<String>,
  tests: usize,
  manifest: String,
  skipped: &'a [String],
  dry_run: bool,
}

/// Run the select command
pub fn run_select(args: SelectArgs) -> AffectedResult<()> {
  let format = OutputFormat::parse(&args.format)?;

  let cwd = std::env::current_dir().context("Failed to get current directory")?;
  let git = SystemGit::open(&cwd)?;
  let root = git.work_tree().to_path_buf();

  let config = AffectedConfig::resolve(&root, args.config.as_deref())?;
  let graph = config.module_graph();
  for cycle in graph.find_cycles() {
    tracing::warn!("dependency cycle between modules: {}", cycle.join(", "));
  }
  tracing::debug!(
    "dependency graph: {} modules, {} declarations",
    graph.modules().len(),
    graph.edge_count()
  );

  let collector = TestCollector::new(&root, &config.tests.dir);
  let manifest_path = args.output.clone().unwrap_or_else(|| config.tests.manifest.clone());

  let show_progress = format == OutputFormat::Text && std::io::stderr().is_terminal();
  let (analysis, manifest) = select(
    &git,
    &graph,
    &collector,
    (args.from.as_str(), args.to.as_str()),
    args.keep_going,
    show_progress,
  )?;

  if !args.dry_run {
    manifest.write_to(&manifest_path)?;
  }

  match format {
    OutputFormat::Text => display_text(&analysis, &manifest, &manifest_path, args.dry_run),
    OutputFormat::Json => display_json(&args, &analysis, &manifest, &manifest_path)?,
  }

  Ok(())
}

/// Analyze a change and render its manifest without touching the output file.
pub fn select(
  source: &impl ChangeSource,
  graph: &ModuleGraph,
  collector: &TestCollector,
  (from, to): (&str, &str),
  keep_going: bool,
  show_progress: bool,
) -> AffectedResult<(AffectedAnalysis, Manifest)> {
  let analysis = affected::analyze(source, graph, from, to)?;
  tracing::info!(
    "{} modified modules, {} testable",
    analysis.modified.len(),
    analysis.testable.len()
  );

  let mut progress =
    (show_progress && !analysis.is_empty()).then(|| ModuleProgress::new(analysis.testable.len(), "Collecting tests"));
  let manifest = Manifest::render(&analysis.testable, collector, keep_going, progress.as_mut())?;

  Ok((analysis, manifest))
}

fn join_or_none(modules: &BTreeSet<String>) -> String {
  if modules.is_empty() {
    "(none)".to_string()
  } else {
    modules.iter().cloned().collect::<Vec<_>>().join(", ")
  }
}

/// Display results in human-readable text format
fn display_text(analysis: &AffectedAnalysis, manifest: &Manifest, manifest_path: &Path, dry_run: bool) {
  println!("Modified modules: {}", join_or_none(&analysis.modified));
  println!("Testable modules: {}", join_or_none(&analysis.testable));

  if !manifest.skipped.is_empty() {
    println!("⚠️  Skipped modules: {}", manifest.skipped.join(", "));
  }

  if dry_run {
    println!(
      "DRY RUN: Would write {} tests to {}",
      manifest.tests,
      manifest_path.display()
    );
  } else {
    println!("Wrote {} tests to {}", manifest.tests, manifest_path.display());
  }
}

/// Display results in JSON format
fn display_json(
  args: &SelectArgs,
  analysis: &AffectedAnalysis,
  manifest: &Manifest,
  manifest_path: &Path,
) -> AffectedResult<()> {
  let report = Report {
    from: &args.from,
    to: &args.to,
    modified: &analysis.modified,
    testable: &analysis.testable,
    tests: manifest.tests,
    manifest: manifest_path.display().to_string(),
    skipped: &manifest.skipped,
    dry_run: args.dry_run,
  };

  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
