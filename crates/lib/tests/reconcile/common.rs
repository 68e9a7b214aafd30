//! Shared helpers for reconciliation tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use zcfg_lib::Reconciler;
use zcfg_lib::facts::{AgentVersion, DeliveryMode, HostFacts, HostProbe, InstrumentationFacts};
use zcfg_lib::platform::Platform;
use zcfg_lib::platform::arch::Arch;
use zcfg_lib::platform::paths::TargetPaths;
use zcfg_lib::store::{FileMultiStringStore, StoreMerger};

/// A target root plus an emulated registry, both under one temp dir.
pub struct Host {
  pub temp: TempDir,
  pub reconciler: Reconciler,
}

impl Host {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let reconciler = Reconciler::new(
      TargetPaths::new(Some(temp.path().join("root").as_path())),
      StoreMerger::new(Box::new(FileMultiStringStore::new(temp.path().join("registry")))),
    );
    Self { temp, reconciler }
  }

  pub fn paths(&self) -> &TargetPaths {
    self.reconciler.paths()
  }

  pub fn registry(&self) -> FileMultiStringStore {
    FileMultiStringStore::new(self.temp.path().join("registry"))
  }

  pub fn write(&self, path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  pub fn read(&self, path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
  }

  pub fn zeroconfig(&self, file_name: &str) -> PathBuf {
    self.paths().zeroconfig(file_name)
  }
}

pub fn facts(version: &str, mode: DeliveryMode) -> InstrumentationFacts {
  InstrumentationFacts::new(
    AgentVersion::parse(version).unwrap(),
    mode,
    HostFacts::linux(Arch::X86_64),
  )
}

/// Probe answering from fixed values.
pub struct FixedProbe {
  pub platform: Option<Platform>,
  pub nodejs: bool,
  pub systemd: bool,
}

impl HostProbe for FixedProbe {
  fn platform(&self) -> Option<Platform> {
    self.platform
  }

  fn nodejs_present(&self) -> bool {
    self.nodejs
  }

  fn systemd_capable(&self) -> bool {
    self.systemd
  }
}

pub const LIBSPLUNK: &str = "/usr/lib/splunk-instrumentation/libsplunk.so";
