use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::EnvSet;
use crate::error::ReconcileError;
use crate::facts::Sdk;
use crate::render::{self, Format, InvalidValueError};

/// Identity of one configuration artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Artifact {
  LegacyConfig,
  ZeroConfig(Sdk),
  SystemdDefaults,
  Preload,
  CollectorEnv,
}

impl Artifact {
  /// True for artifacts read by instrumented applications, as opposed to the
  /// collector service.
  pub fn is_instrumentation(&self) -> bool {
    !matches!(self, Self::CollectorEnv)
  }
}

impl fmt::Display for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::LegacyConfig => write!(f, "legacy-config"),
      Self::ZeroConfig(sdk) => write!(f, "zeroconfig:{}", sdk),
      Self::SystemdDefaults => write!(f, "systemd-defaults"),
      Self::Preload => write!(f, "preload"),
      Self::CollectorEnv => write!(f, "collector-env"),
    }
  }
}

impl FromStr for Artifact {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "legacy-config" => Ok(Self::LegacyConfig),
      "systemd-defaults" => Ok(Self::SystemdDefaults),
      "preload" => Ok(Self::Preload),
      "collector-env" => Ok(Self::CollectorEnv),
      _ => {
        let sdk = s
          .strip_prefix("zeroconfig:")
          .and_then(|name| Sdk::ALL.into_iter().find(|sdk| sdk.as_str() == name))
          .ok_or_else(|| format!("unknown artifact: {}", s))?;
        Ok(Self::ZeroConfig(sdk))
      }
    }
  }
}

impl From<Artifact> for String {
  fn from(value: Artifact) -> Self {
    value.to_string()
  }
}

impl TryFrom<String> for Artifact {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

/// Where an artifact lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  File(PathBuf),
  /// A value under `HKEY_LOCAL_MACHINE`.
  Registry { key: String, value: String },
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File(path) => write!(f, "{}", path.display()),
      Self::Registry { key, value } => write!(f, "HKLM\\{}\\{}", key, value),
    }
  }
}

/// Whether a target belongs wholly to this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
  /// Replaced wholesale with the rendered payload.
  Owned,
  /// Merged into, preserving entries written by others.
  Shared,
}

/// Lines to keep in a shared line-oriented file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSet {
  /// Lines that must be present.
  pub wanted: Vec<String>,
  /// Lines this tool owns; removed when not wanted.
  pub managed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
  Env(EnvSet),
  Lines(LineSet),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Write(Payload),
  /// Remove the target if present.
  Delete,
}

impl Action {
  pub fn is_write(&self) -> bool {
    matches!(self, Self::Write(_))
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Write(_) => "write",
      Self::Delete => "delete",
    }
  }
}

/// One artifact, its target and what should happen to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
  pub artifact: Artifact,
  pub target: Target,
  pub ownership: Ownership,
  pub action: Action,
}

impl Directive {
  /// Encoding of the target's key/value content.
  pub fn format(&self) -> Format {
    match (&self.target, self.artifact) {
      (Target::Registry { .. }, _) => Format::MultiString,
      (_, Artifact::SystemdDefaults) => Format::SystemdDefaultEnvironment,
      _ => Format::FlatFile,
    }
  }

  /// The payload's key/values, if it has any.
  pub fn env(&self) -> Option<&EnvSet> {
    match &self.action {
      Action::Write(Payload::Env(env)) => Some(env),
      _ => None,
    }
  }

  /// Render the payload on its own to surface invalid keys or values.
  pub fn validate(&self) -> Result<(), ReconcileError> {
    let result = match &self.action {
      Action::Write(Payload::Env(env)) => render::render(env, self.format()).map(drop),
      Action::Write(Payload::Lines(lines)) => render::render_lines(&lines.wanted).map(drop),
      Action::Delete => Ok(()),
    };
    result.map_err(|e| self.invalid(e))
  }

  pub(crate) fn invalid(&self, e: InvalidValueError) -> ReconcileError {
    ReconcileError::InvalidValue {
      artifact: self.artifact,
      key: e.key,
      reason: e.reason,
    }
  }
}
