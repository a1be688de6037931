mod collect;
mod commands;
mod core;
mod graph;
mod ui;
mod utils;

use clap::Parser;
use commands::SelectArgs;
use crate::core::error::{AffectedError, print_error};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

/// List the tests of every module affected between two revisions
///
/// Writes `# tests for <module>` blocks to tests.txt for the changed modules and every
/// module that depends on them.
#[derive(Parser)]
#[command(name = "affected-tests")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Revision to diff from (commit, branch, tag)
  from_commit: String,

  /// Revision to diff to (commit, branch, tag)
  to_commit: String,

  /// Manifest path (default: tests.txt, or `tests.manifest` from affected.toml)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Config file (default: affected.toml in the repository root, if present)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Report format: text (default), json
  #[arg(long, default_value = "text")]
  format: String,

  /// Report the selection without writing the manifest
  #[arg(long)]
  dry_run: bool,

  /// Skip modules whose test directory cannot be read instead of failing
  #[arg(long)]
  keep_going: bool,

  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays the report.
///
/// `AFFECTED_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env("AFFECTED_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

  fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    // --help and --version
    Err(err) if !err.use_stderr() => err.exit(),
    Err(err) => handle_error(invalid_arguments(&err)),
  };

  init_logging(cli.verbose);

  let result = commands::run_select(SelectArgs {
    from: cli.from_commit,
    to: cli.to_commit,
    output: cli.output,
    config: cli.config,
    format: cli.format,
    dry_run: cli.dry_run,
    keep_going: cli.keep_going,
  });

  if let Err(err) = result {
    handle_error(err);
  }
}

/// First paragraph of clap's rendered error, without the `error:` prefix
fn invalid_arguments(err: &clap::Error) -> AffectedError {
  let rendered = err.render().to_string();
  let message = rendered
    .lines()
    .take_while(|line| !line.trim().is_empty())
    .map(str::trim)
    .collect::<Vec<_>>()
    .join(" ");

  AffectedError::InvalidArguments {
    message: message.trim_start_matches("error: ").to_string(),
  }
}

fn handle_error(err: AffectedError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
