//! The desired-state file and its resolution into [`InstrumentationFacts`].
//!
//! # Example
//!
//! ```json
//! {
//!   "version": "0.99.0",
//!   "mode": "systemd",
//!   "sdks": ["java", "nodejs"],
//!   "overrides": { "OTEL_TRACES_SAMPLER": "always_on" },
//!   "options": { "service_name": "checkout" },
//!   "collector": { "SPLUNK_REALM": "us0" },
//!   "host": { "nodejs_present": true }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::Platform;
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::platform::probe;

use super::types::{DeliveryMode, HostFacts, InstallLayout, InstrumentationFacts, InstrumentationOptions, Sdk};
use super::version::{AgentVersion, VersionGates};

/// Errors loading or resolving a facts file.
#[derive(Debug, Error)]
pub enum FactsError {
  #[error("failed to read facts file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse facts file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("unsupported platform {os}/{arch}; set host.os and host.arch explicitly")]
  UnsupportedPlatform { os: String, arch: String },
}

/// Host values that, when present, replace the corresponding probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostOverrides {
  pub os: Option<Os>,
  pub arch: Option<Arch>,
  pub nodejs_present: Option<bool>,
  pub systemd_capable: Option<bool>,
}

/// On-disk shape of the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactsFile {
  pub version: AgentVersion,
  pub mode: DeliveryMode,
  #[serde(default = "default_sdks")]
  pub sdks: BTreeSet<Sdk>,
  #[serde(default)]
  pub overrides: BTreeMap<String, String>,
  #[serde(default)]
  pub options: InstrumentationOptions,
  #[serde(default)]
  pub layout: InstallLayout,
  #[serde(default)]
  pub collector: Option<BTreeMap<String, String>>,
  #[serde(default)]
  pub gates: VersionGates,
  #[serde(default)]
  pub host: HostOverrides,
}

fn default_sdks() -> BTreeSet<Sdk> {
  BTreeSet::from([Sdk::Java])
}

/// Source of host facts that the facts file does not pin.
pub trait HostProbe {
  fn platform(&self) -> Option<Platform>;
  fn nodejs_present(&self) -> bool;
  fn systemd_capable(&self) -> bool;
}

/// Probes the machine this process runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
  fn platform(&self) -> Option<Platform> {
    Platform::current()
  }

  fn nodejs_present(&self) -> bool {
    probe::nodejs_present()
  }

  fn systemd_capable(&self) -> bool {
    probe::systemd_capable()
  }
}

impl FactsFile {
  /// Read and parse a facts file.
  pub fn load(path: &Path) -> Result<Self, FactsError> {
    let content = fs::read_to_string(path).map_err(|source| FactsError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content).map_err(|source| FactsError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  /// Fill unpinned host values from `probe` and freeze the result.
  ///
  /// Each probe is consulted at most once.
  pub fn resolve(self, probe: &dyn HostProbe) -> Result<InstrumentationFacts, FactsError> {
    let detected = match (self.host.os, self.host.arch) {
      (Some(_), Some(_)) => None,
      _ => probe.platform(),
    };

    let os = self.host.os.or(detected.map(|p| p.os));
    let arch = self.host.arch.or(detected.map(|p| p.arch));
    let (Some(os), Some(arch)) = (os, arch) else {
      return Err(FactsError::UnsupportedPlatform {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
      });
    };

    let nodejs_present = match self.host.nodejs_present {
      Some(present) => present,
      None if self.sdks.contains(&Sdk::Nodejs) => probe.nodejs_present(),
      None => false,
    };
    if self.sdks.contains(&Sdk::Nodejs) && !nodejs_present {
      warn!("nodejs instrumentation requested but npm was not found; skipping nodejs");
    }

    let systemd_capable = match self.host.systemd_capable {
      Some(capable) => capable,
      None if self.mode == DeliveryMode::Systemd => probe.systemd_capable(),
      None => false,
    };

    let facts = InstrumentationFacts {
      version: self.version,
      mode: self.mode,
      sdks: self.sdks,
      nodejs_present,
      overrides: self.overrides,
      options: self.options,
      layout: self.layout,
      host: HostFacts {
        os,
        arch,
        systemd_capable,
      },
      collector: self.collector,
      gates: self.gates,
    };
    debug!(version = %facts.version, mode = %facts.mode, host = ?facts.host, "resolved facts");
    Ok(facts)
  }
}
