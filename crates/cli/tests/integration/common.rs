//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the facts file, a
/// target root and a data directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub facts_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file, copied to a temporary `facts.json`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.set_facts(&fixture_content(name));
    env
  }

  /// Create an environment without a facts file.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let facts_path = temp.path().join("facts.json");
    Self { temp, facts_path }
  }

  /// Replace the facts file.
  pub fn set_facts(&self, content: &str) {
    std::fs::write(&self.facts_path, content).unwrap();
  }

  /// Replace the facts file with another fixture.
  pub fn use_fixture(&self, name: &str) {
    self.set_facts(&fixture_content(name));
  }

  /// Prefix every file target lands under.
  pub fn root_path(&self) -> PathBuf {
    let p = self.temp.path().join("root");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Data path for the lock, the report and the emulated registry.
  pub fn data_path(&self) -> PathBuf {
    let p = self.temp.path().join("data");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Absolute target path re-anchored under the test root.
  pub fn target(&self, absolute: &str) -> PathBuf {
    self.root_path().join(absolute.trim_start_matches('/'))
  }

  /// Write a file under the test root.
  pub fn write_target(&self, absolute: &str, content: &str) {
    let path = self.target(absolute);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_target(&self, absolute: &str) -> String {
    std::fs::read_to_string(self.target(absolute)).unwrap()
  }

  pub fn report_path(&self) -> PathBuf {
    self.data_path().join("last-report.json")
  }

  /// Get a pre-configured Command for the zcfg binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `ZCFG_ROOT`: prefix for every file target
  /// - `ZCFG_DATA_DIR`: lock, report and emulated registry
  pub fn zcfg_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("zcfg");
    cmd.env("ZCFG_ROOT", self.root_path());
    cmd.env("ZCFG_DATA_DIR", self.data_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `zcfg <command> <facts.json>`.
  pub fn run(&self, command: &str) -> Command {
    let mut cmd = self.zcfg_cmd();
    cmd.arg(command).arg(&self.facts_path);
    cmd
  }
}
