//! Installed agent version and the gate comparisons made against it.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid agent version {input:?}: {reason}")]
pub struct VersionError {
  pub input: String,
  pub reason: String,
}

/// The instrumentation agent version a run targets.
///
/// `Latest` compares greater than or equal to every release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgentVersion {
  Latest,
  Release(Version),
}

impl AgentVersion {
  /// Parse `latest` (any case) or a dotted numeric version.
  ///
  /// A leading `v` is accepted and missing minor/patch components are zero
  /// filled, so `0.87` parses as `0.87.0`. A `~` revision separator is read
  /// as `-`.
  pub fn parse(input: &str) -> Result<Self, VersionError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("latest") {
      return Ok(Self::Latest);
    }

    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let (core, suffix) = match bare.find(['-', '+', '~']) {
      Some(idx) => bare.split_at(idx),
      None => (bare, ""),
    };
    let suffix = suffix.replacen('~', "-", 1);

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
      return Err(VersionError {
        input: input.to_string(),
        reason: "expected MAJOR[.MINOR[.PATCH]]".to_string(),
      });
    }
    while parts.len() < 3 {
      parts.push("0");
    }

    let normalized = format!("{}{}", parts.join("."), suffix);
    Version::parse(&normalized).map(Self::Release).map_err(|e| VersionError {
      input: input.to_string(),
      reason: e.to_string(),
    })
  }

  /// True when this version meets `gate`.
  ///
  /// Only MAJOR.MINOR.PATCH is compared. A suffix such as a package revision
  /// (`0.87.0-1`) never drops a release below its own base version.
  pub fn at_least(&self, gate: &Version) -> bool {
    match self {
      Self::Latest => true,
      Self::Release(v) => Version::new(v.major, v.minor, v.patch) >= *gate,
    }
  }

  pub fn is_latest(&self) -> bool {
    matches!(self, Self::Latest)
  }
}

impl fmt::Display for AgentVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Latest => write!(f, "latest"),
      Self::Release(v) => write!(f, "{}", v),
    }
  }
}

impl TryFrom<String> for AgentVersion {
  type Error = VersionError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value)
  }
}

impl From<AgentVersion> for String {
  fn from(value: AgentVersion) -> Self {
    value.to_string()
  }
}

/// Minimum agent versions for each policy branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionGates {
  /// Below this the legacy single-file config is used instead of zeroconfig.
  pub zeroconfig: Version,
  /// First release shipping the nodejs agent.
  pub nodejs: Version,
  /// First release shipping the .NET agent.
  pub dotnet: Version,
}

impl Default for VersionGates {
  fn default() -> Self {
    Self {
      zeroconfig: Version::new(0, 87, 0),
      nodejs: Version::new(0, 87, 0),
      dotnet: Version::new(0, 99, 0),
    }
  }
}
