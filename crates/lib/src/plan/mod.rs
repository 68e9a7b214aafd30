//! Computing the artifacts a set of facts requires.
//!
//! [`plan`] is a pure function of the facts and the target locations. It
//! emits one directive per target: instrumentation artifacts that the
//! effective mode does not select always receive a [`Action::Delete`], so
//! switching modes cleans up after the previous one.

mod env;
mod types;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::consts::{COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE};
use crate::env::{EnvSet, is_blank};
use crate::error::ReconcileError;
use crate::facts::{DeliveryMode, InstrumentationFacts, Sdk};
use crate::platform::os::Os;
use crate::platform::paths::TargetPaths;

pub use env::{common_env, legacy_env, resource_attributes, sdk_env, systemd_env, zeroconfig_env};
pub use types::{Action, Artifact, Directive, LineSet, Ownership, Payload, Target};

/// The ordered directives of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
  /// Effective delivery mode; `None` where instrumentation is not managed.
  pub mode: Option<DeliveryMode>,
  pub directives: Vec<Directive>,
}

impl Plan {
  pub fn get(&self, artifact: Artifact) -> Option<&Directive> {
    self.directives.iter().find(|d| d.artifact == artifact)
  }

  /// Artifacts that will be written.
  pub fn writes(&self) -> impl Iterator<Item = &Directive> {
    self.directives.iter().filter(|d| d.action.is_write())
  }

  /// Render every payload, failing on the first invalid key or value.
  pub fn validate(&self) -> Result<(), ReconcileError> {
    self.directives.iter().try_for_each(Directive::validate)
  }
}

/// Resolve the delivery mode the facts actually get.
///
/// A systemd request needs a systemd-capable host. Any other request is
/// decided by the agent version: releases older than the zeroconfig gate
/// only understand the single legacy file.
pub fn effective_mode(facts: &InstrumentationFacts) -> Result<DeliveryMode, ReconcileError> {
  match facts.mode {
    DeliveryMode::Systemd if facts.host.systemd_capable => Ok(DeliveryMode::Systemd),
    DeliveryMode::Systemd => Err(ReconcileError::Precondition {
      reason: "systemd delivery requested but the host is not systemd-capable".to_string(),
    }),
    _ if facts.version.at_least(&facts.gates.zeroconfig) => Ok(DeliveryMode::Zeroconfig),
    _ => Ok(DeliveryMode::Legacy),
  }
}

/// True when `sdk` is enabled and this host and agent version can run it.
pub fn qualifies(facts: &InstrumentationFacts, sdk: Sdk) -> bool {
  if !facts.is_enabled(sdk) {
    return false;
  }
  match sdk {
    Sdk::Java => true,
    Sdk::Nodejs => facts.version.at_least(&facts.gates.nodejs) && facts.nodejs_present,
    Sdk::Dotnet => facts.version.at_least(&facts.gates.dotnet) && facts.host.arch.supports_dotnet(),
  }
}

/// Compute the directives for `facts` against the file locations in `paths`.
pub fn plan(facts: &InstrumentationFacts, paths: &TargetPaths) -> Result<Plan, ReconcileError> {
  let mut directives = Vec::new();

  let mode = match facts.host.os {
    Os::Linux => {
      let mode = effective_mode(facts)?;
      plan_instrumentation(facts, paths, mode, &mut directives);
      Some(mode)
    }
    Os::Windows => None,
  };

  if let Some(collector) = &facts.collector {
    directives.push(collector_directive(collector, facts.host.os, &paths.collector_env));
  }

  for directive in &directives {
    debug!(artifact = %directive.artifact, target = %directive.target, action = directive.action.name(), "planned");
  }
  Ok(Plan { mode, directives })
}

fn plan_instrumentation(
  facts: &InstrumentationFacts,
  paths: &TargetPaths,
  mode: DeliveryMode,
  directives: &mut Vec<Directive>,
) {
  let qualifying: Vec<Sdk> = Sdk::ALL.into_iter().filter(|sdk| qualifies(facts, *sdk)).collect();
  let mut preload_wanted = false;

  let legacy = (mode == DeliveryMode::Legacy && facts.is_enabled(Sdk::Java)).then(|| legacy_env(facts));
  preload_wanted |= legacy.is_some();
  directives.push(owned_file(Artifact::LegacyConfig, &paths.instrumentation_config, legacy));

  for sdk in Sdk::ALL {
    let env = (mode == DeliveryMode::Zeroconfig && qualifying.contains(&sdk)).then(|| zeroconfig_env(facts, sdk));
    preload_wanted |= env.is_some();
    directives.push(owned_file(Artifact::ZeroConfig(sdk), &paths.zeroconfig(sdk.config_file_name()), env));
  }

  let systemd = (mode == DeliveryMode::Systemd)
    .then(|| systemd_env(facts, &qualifying))
    .filter(|env| !env.is_effectively_empty());
  directives.push(owned_file(Artifact::SystemdDefaults, &paths.systemd_defaults(), systemd));

  directives.push(preload_directive(facts, &paths.preload, preload_wanted));
}

fn owned_file(artifact: Artifact, path: &Path, env: Option<EnvSet>) -> Directive {
  Directive {
    artifact,
    target: Target::File(path.to_path_buf()),
    ownership: Ownership::Owned,
    action: match env {
      Some(env) => Action::Write(Payload::Env(env)),
      None => Action::Delete,
    },
  }
}

/// The preload file is shared with other libraries, so it is always edited
/// line by line instead of being replaced or deleted.
fn preload_directive(facts: &InstrumentationFacts, path: &Path, libsplunk_wanted: bool) -> Directive {
  let libsplunk = facts.layout.libsplunk.clone();
  let mut wanted = Vec::new();
  if libsplunk_wanted {
    wanted.push(libsplunk.clone());
  }
  for line in &facts.options.preload_extra {
    let line = line.trim();
    if !is_blank(line) && !wanted.iter().any(|w| w == line) {
      wanted.push(line.to_string());
    }
  }

  Directive {
    artifact: Artifact::Preload,
    target: Target::File(path.to_path_buf()),
    ownership: Ownership::Shared,
    action: Action::Write(Payload::Lines(LineSet {
      wanted,
      managed: vec![libsplunk],
    })),
  }
}

fn collector_directive(collector: &BTreeMap<String, String>, os: Os, collector_env: &Path) -> Directive {
  let env: EnvSet = collector.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
  match os {
    Os::Linux => owned_file(Artifact::CollectorEnv, collector_env, Some(env)),
    Os::Windows => Directive {
      artifact: Artifact::CollectorEnv,
      target: Target::Registry {
        key: COLLECTOR_SERVICE_KEY.to_string(),
        value: COLLECTOR_SERVICE_VALUE.to_string(),
      },
      ownership: Ownership::Shared,
      action: Action::Write(Payload::Env(env)),
    },
  }
}
