use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DOTNET_HOME_DIR, INSTRUMENTATION_HOME, JAVA_AGENT_JAR, LIBSPLUNK, NODE_PREFIX_DIR};
use crate::platform::arch::Arch;
use crate::platform::os::Os;

use super::version::{AgentVersion, VersionGates};

/// How instrumentation variables reach target processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
  /// `libsplunk.so` preload reading one combined `instrumentation.conf`.
  #[serde(alias = "legacy-single-file")]
  Legacy,
  /// `libsplunk.so` preload reading one zeroconfig file per SDK.
  #[serde(alias = "per-process-zeroconfig")]
  Zeroconfig,
  /// A systemd manager drop-in exporting the variables to every unit.
  #[serde(alias = "systemd-wide-default")]
  Systemd,
}

impl DeliveryMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Legacy => "legacy",
      Self::Zeroconfig => "zeroconfig",
      Self::Systemd => "systemd",
    }
  }
}

impl fmt::Display for DeliveryMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Language SDKs that can be auto-instrumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sdk {
  Java,
  #[serde(alias = "node")]
  Nodejs,
  Dotnet,
}

impl Sdk {
  pub const ALL: [Sdk; 3] = [Sdk::Java, Sdk::Nodejs, Sdk::Dotnet];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Java => "java",
      Self::Nodejs => "nodejs",
      Self::Dotnet => "dotnet",
    }
  }

  /// File name of this SDK's zeroconfig file.
  pub fn config_file_name(&self) -> &'static str {
    match self {
      Self::Java => "java.conf",
      Self::Nodejs => "node.conf",
      Self::Dotnet => "dotnet.conf",
    }
  }
}

impl fmt::Display for Sdk {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Instrumentation settings shared by every SDK.
///
/// String options left empty are omitted from rendered artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentationOptions {
  pub service_name: String,
  /// Appended to the generated `splunk.zc.method` attribute.
  pub resource_attributes: String,
  pub deployment_environment: String,
  pub generate_service_name: bool,
  pub disable_telemetry: bool,
  pub enable_profiler: bool,
  pub enable_profiler_memory: bool,
  pub enable_metrics: bool,
  pub otlp_endpoint: String,
  pub otlp_endpoint_protocol: String,
  pub metrics_exporter: String,
  pub logs_exporter: String,
  /// Extra lines kept in the preload file regardless of mode.
  pub preload_extra: Vec<String>,
}

impl Default for InstrumentationOptions {
  fn default() -> Self {
    Self {
      service_name: String::new(),
      resource_attributes: String::new(),
      deployment_environment: String::new(),
      generate_service_name: true,
      disable_telemetry: false,
      enable_profiler: false,
      enable_profiler_memory: false,
      enable_metrics: false,
      otlp_endpoint: String::new(),
      otlp_endpoint_protocol: String::new(),
      metrics_exporter: String::new(),
      logs_exporter: String::new(),
      preload_extra: Vec::new(),
    }
  }
}

/// Where the agent package installed its assets.
///
/// These paths are written into artifacts, they are never targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallLayout {
  pub java_agent_jar: String,
  pub libsplunk: String,
  pub node_prefix: String,
  pub dotnet_home: String,
}

impl Default for InstallLayout {
  fn default() -> Self {
    Self {
      java_agent_jar: format!("{}/{}", INSTRUMENTATION_HOME, JAVA_AGENT_JAR),
      libsplunk: format!("{}/{}", INSTRUMENTATION_HOME, LIBSPLUNK),
      node_prefix: format!("{}/{}", INSTRUMENTATION_HOME, NODE_PREFIX_DIR),
      dotnet_home: format!("{}/{}", INSTRUMENTATION_HOME, DOTNET_HOME_DIR),
    }
  }
}

/// What the host can do, probed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
  pub os: Os,
  pub arch: Arch,
  pub systemd_capable: bool,
}

impl HostFacts {
  pub fn linux(arch: Arch) -> Self {
    Self {
      os: Os::Linux,
      arch,
      systemd_capable: true,
    }
  }
}

/// The desired state of one reconciliation run.
///
/// Constructed once from the facts file and the host probes, then passed by
/// reference to the planner. Nothing in it changes during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentationFacts {
  pub version: AgentVersion,
  pub mode: DeliveryMode,
  pub sdks: BTreeSet<Sdk>,
  pub nodejs_present: bool,
  pub overrides: BTreeMap<String, String>,
  pub options: InstrumentationOptions,
  pub layout: InstallLayout,
  pub host: HostFacts,
  /// Collector environment; `None` leaves the collector store alone.
  pub collector: Option<BTreeMap<String, String>>,
  pub gates: VersionGates,
}

impl InstrumentationFacts {
  /// Facts with default options, java enabled and no collector store.
  pub fn new(version: AgentVersion, mode: DeliveryMode, host: HostFacts) -> Self {
    Self {
      version,
      mode,
      sdks: BTreeSet::from([Sdk::Java]),
      nodejs_present: false,
      overrides: BTreeMap::new(),
      options: InstrumentationOptions::default(),
      layout: InstallLayout::default(),
      host,
      collector: None,
      gates: VersionGates::default(),
    }
  }

  pub fn with_sdks(mut self, sdks: impl IntoIterator<Item = Sdk>) -> Self {
    self.sdks = sdks.into_iter().collect();
    self
  }

  pub fn is_enabled(&self, sdk: Sdk) -> bool {
    self.sdks.contains(&sdk)
  }
}
