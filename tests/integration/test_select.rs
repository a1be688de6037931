//! Integration tests for `affected-tests <FROM> <TO>`

use crate::helpers::{
  TestRepo, git, run_affected_tests, run_affected_tests_env, run_affected_tests_raw, seeded_repo,
};
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_change_in_api_selects_api_and_client() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int x; }\n")?;
  let head = repo.commit("Touch runelite-api")?;

  let output = run_affected_tests(&repo.path, &[&base, &head])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(
    repo.read_file("tests.txt")?,
    "# tests for runelite-api\n\
     net/runelite/api/VarbitTest.java\n\
     # tests for runelite-client\n\
     net/runelite/client/ClientTest.java\n\
     net/runelite/client/plugins/PluginTest.java\n"
  );
  assert!(stdout.contains("Modified modules: runelite-api"), "{}", stdout);
  assert!(
    stdout.contains("Testable modules: runelite-api, runelite-client"),
    "{}",
    stdout
  );
  assert!(stdout.contains("Wrote 3 tests to tests.txt"), "{}", stdout);

  Ok(())
}

#[test]
fn test_change_in_cache_reaches_whole_chain() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("cache/src/main/java/Main.java", "public class Main { int y; }\n")?;
  let head = repo.commit("Touch cache")?;

  run_affected_tests(&repo.path, &[&base, &head])?;

  assert_eq!(
    repo.read_file("tests.txt")?,
    "# tests for cache\n\
     net/runelite/cache/StoreTest.java\n\
     # tests for cache-client\n\
     net/runelite/cache/client/ClientTest.java\n\
     # tests for cache-updater\n\
     # tests for runelite-client\n\
     net/runelite/client/ClientTest.java\n\
     net/runelite/client/plugins/PluginTest.java\n\
     # tests for runelite-script-assembler-plugin\n"
  );

  Ok(())
}

#[test]
fn test_no_changes_writes_empty_manifest() -> Result<()> {
  let (repo, base) = seeded_repo()?;
  repo.write("tests.txt", "# tests for stale\nOld.java\n")?;

  let output = run_affected_tests(&repo.path, &[&base, &base])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(repo.read_file("tests.txt")?, "");
  assert!(stdout.contains("Testable modules: (none)"), "{}", stdout);
  assert!(stdout.contains("Wrote 0 tests"), "{}", stdout);

  Ok(())
}

#[test]
fn test_root_level_change_selects_nothing() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("pom.xml", "<project><modules/></project>\n")?;
  let head = repo.commit("Touch root build file")?;

  run_affected_tests(&repo.path, &[&base, &head])?;
  assert_eq!(repo.read_file("tests.txt")?, "");

  Ok(())
}

#[test]
fn test_undeclared_module_tests_itself() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.add_source("http-service", "Service")?;
  repo.add_test("http-service", "ServiceTest")?;
  let head = repo.commit("Add http-service")?;

  run_affected_tests(&repo.path, &[&base, &head])?;
  assert_eq!(repo.read_file("tests.txt")?, "# tests for http-service\nServiceTest.java\n");

  Ok(())
}

#[test]
fn test_unknown_revision_fails_without_manifest() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  let output = run_affected_tests_raw(&repo.path, &["no-such-revision", &base])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "{}", stderr);
  assert!(stderr.contains("no-such-revision"), "{}", stderr);
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_missing_revision_is_usage_error() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  let output = run_affected_tests_raw(&repo.path, &[&base])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1), "{}", stderr);
  assert!(stderr.contains("Invalid arguments"), "{}", stderr);
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_outside_repository_fails() -> Result<()> {
  let dir = TempDir::new()?;

  let output = run_affected_tests_raw(dir.path(), &["HEAD~1", "HEAD"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(!dir.path().join("tests.txt").exists());

  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("cache-client/src/main/java/Main.java", "public class Main { int z; }\n")?;
  let head = repo.commit("Touch cache-client")?;

  let output = run_affected_tests(&repo.path, &[&base, &head, "--format", "json"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let json: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(json["from"], base.as_str());
  assert_eq!(json["to"], head.as_str());
  assert_eq!(json["modified"], serde_json::json!(["cache-client"]));
  assert_eq!(json["testable"], serde_json::json!(["cache-client", "cache-updater"]));
  assert_eq!(json["tests"], 1);
  assert_eq!(json["dry_run"], false);
  assert!(repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_unknown_format_is_usage_error() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  let output = run_affected_tests_raw(&repo.path, &[&base, &base, "--format", "yaml"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_dry_run_leaves_manifest_alone() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("runelite-jshell/src/main/java/Main.java", "public class Main { int w; }\n")?;
  let head = repo.commit("Touch runelite-jshell")?;

  let output = run_affected_tests(&repo.path, &[&base, &head, "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN"), "{}", stdout);
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_custom_output_path() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int v; }\n")?;
  let head = repo.commit("Touch runelite-api")?;
  std::fs::create_dir_all(repo.path.join("build"))?;

  run_affected_tests(&repo.path, &[&base, &head, "-o", "build/selected.txt"])?;

  assert!(!repo.file_exists("tests.txt"));
  assert!(
    repo
      .read_file("build/selected.txt")?
      .starts_with("# tests for runelite-api\n")
  );

  Ok(())
}

#[test]
fn test_config_replaces_builtin_graph() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write(
    "affected.toml",
    r#"[tests]
manifest = "selected.txt"

[[depends]]
module = "runelite-jshell"
on = ["runelite-api"]
"#,
  )?;
  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int u; }\n")?;
  let head = repo.commit("Declare custom graph")?;

  run_affected_tests(&repo.path, &[&base, &head])?;

  assert!(!repo.file_exists("tests.txt"));
  assert_eq!(
    repo.read_file("selected.txt")?,
    "# tests for runelite-api\n\
     net/runelite/api/VarbitTest.java\n\
     # tests for runelite-jshell\n"
  );

  Ok(())
}

#[test]
fn test_invalid_config_is_usage_error() -> Result<()> {
  let (repo, base) = seeded_repo()?;
  repo.write("affected.toml", "[tests]\nunknown = 1\n")?;

  let output = run_affected_tests_raw(&repo.path, &[&base, &base])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[test]
fn test_run_from_subdirectory() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int t; }\n")?;
  let head = repo.commit("Touch runelite-api")?;

  let subdir = repo.path.join("runelite-client");
  run_affected_tests(&subdir, &[&base, &head])?;

  let manifest = repo.read_file("runelite-client/tests.txt")?;
  assert!(manifest.contains("# tests for runelite-client\n"), "{}", manifest);
  assert!(manifest.contains("net/runelite/api/VarbitTest.java\n"), "{}", manifest);

  Ok(())
}

#[test]
fn test_rename_counts_both_sides() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_source("runelite-jshell", "Shell")?;
  repo.add_test("runelite-jshell", "ShellTest")?;
  repo.add_test("cache", "StoreTest")?;
  let base = repo.commit("Add modules")?;

  std::fs::create_dir_all(repo.path.join("cache/src/main/java"))?;
  git(
    &repo.path,
    &[
      "mv",
      "runelite-jshell/src/main/java/Shell.java",
      "cache/src/main/java/Shell.java",
    ],
  )?;
  let head = repo.commit("Move Shell into cache")?;

  let output = run_affected_tests(&repo.path, &[&base, &head, "--dry-run", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let modified = json["modified"].as_array().cloned().unwrap_or_default();
  assert!(modified.contains(&serde_json::json!("cache")), "{}", json);
  assert!(modified.contains(&serde_json::json!("runelite-jshell")), "{}", json);

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_tests_fail_and_keep_stale_manifest() -> Result<()> {
  use crate::helpers::{lock_dir, unlock_dir};

  let (repo, base) = seeded_repo()?;
  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int s; }\n")?;
  let head = repo.commit("Touch runelite-api")?;
  repo.write("tests.txt", "# tests for stale\nOld.java\n")?;

  let locked = "runelite-client/src/test/java/net/runelite/client/plugins";
  if !lock_dir(&repo, locked)? {
    return Ok(());
  }
  let output = run_affected_tests_raw(&repo.path, &[&base, &head]);
  unlock_dir(&repo, locked)?;
  let output = output?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "{}", stderr);
  assert!(stderr.contains("runelite-client"), "{}", stderr);
  assert_eq!(repo.read_file("tests.txt")?, "# tests for stale\nOld.java\n");

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_keep_going_skips_unreadable_module() -> Result<()> {
  use crate::helpers::{lock_dir, unlock_dir};

  let (repo, base) = seeded_repo()?;
  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int r; }\n")?;
  let head = repo.commit("Touch runelite-api")?;

  // The whole module is unreadable, so its test root cannot even be inspected
  let locked = "runelite-client/src";
  if !lock_dir(&repo, locked)? {
    return Ok(());
  }
  let output = run_affected_tests_raw(&repo.path, &[&base, &head, "--keep-going"]);
  unlock_dir(&repo, locked)?;
  let output = output?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(stdout.contains("Skipped modules: runelite-client"), "{}", stdout);
  assert_eq!(
    repo.read_file("tests.txt")?,
    "# tests for runelite-api\nnet/runelite/api/VarbitTest.java\n"
  );

  Ok(())
}

#[test]
fn test_option_like_revision_is_not_passed_as_option() -> Result<()> {
  let (repo, base) = seeded_repo()?;
  let target = repo.path.join("diff-out.txt");
  let option = format!("--output={}", target.display());

  let output = run_affected_tests_raw(&repo.path, &["--", &option, &base])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(!target.exists());
  assert!(!repo.file_exists("tests.txt"));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_path_with_quote_keeps_module_name() -> Result<()> {
  let (repo, base) = seeded_repo()?;

  repo.write("runelite-api/src/main/java/Odd\"Name.java", "public class Odd {}\n")?;
  repo.write("cache-updater/src/main/java/with\ttab.txt", "tab\n")?;
  let head = repo.commit("Add awkward file names")?;

  let output = run_affected_tests(&repo.path, &[&base, &head, "--dry-run", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["modified"], serde_json::json!(["cache-updater", "runelite-api"]));

  Ok(())
}

#[test]
fn test_git_environment_does_not_redirect_repository() -> Result<()> {
  let (repo, base) = seeded_repo()?;
  let other = TestRepo::new()?;

  repo.write("runelite-api/src/main/java/Main.java", "public class Main { int q; }\n")?;
  let head = repo.commit("Touch runelite-api")?;

  let git_dir = other.path.join(".git");
  let output = run_affected_tests_env(
    &repo.path,
    &[&base, &head],
    &[
      ("GIT_DIR", git_dir.to_string_lossy().as_ref()),
      ("GIT_WORK_TREE", other.path.to_string_lossy().as_ref()),
    ],
  )?;

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(!other.file_exists("tests.txt"));
  assert!(
    repo
      .read_file("tests.txt")?
      .starts_with("# tests for runelite-api\nnet/runelite/api/VarbitTest.java\n")
  );

  Ok(())
}
