use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::facts::DeliveryMode;
use crate::plan::{Artifact, Target};
use crate::util::hash::ContentHash;

/// Current report format version.
pub const REPORT_VERSION: u32 = 1;

/// What a run did (or would do) to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Unchanged,
  Created,
  Updated,
  Deleted,
}

impl Outcome {
  pub fn is_change(&self) -> bool {
    !matches!(self, Self::Unchanged)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unchanged => "unchanged",
      Self::Created => "created",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
  pub artifact: Artifact,
  pub target: Target,
  pub outcome: Outcome,
  /// SHA-256 of the content the target holds after the run; `None` when absent.
  pub digest: Option<ContentHash>,
}

/// Which services need a restart to pick up the changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartRequired {
  pub collector: bool,
  pub instrumented_apps: bool,
}

impl RestartRequired {
  pub fn any(&self) -> bool {
    self.collector || self.instrumented_apps
  }
}

/// Per-target outcomes of one run, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
  pub version: u32,
  pub generated_at_unix: u64,
  pub agent_version: String,
  /// Effective delivery mode; `None` where instrumentation is not managed.
  pub mode: Option<DeliveryMode>,
  pub dry_run: bool,
  pub outcomes: Vec<TargetOutcome>,
}

impl ReconcileReport {
  pub fn new(agent_version: String, mode: Option<DeliveryMode>, dry_run: bool) -> Self {
    Self {
      version: REPORT_VERSION,
      generated_at_unix: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs(),
      agent_version,
      mode,
      dry_run,
      outcomes: Vec::new(),
    }
  }

  /// Outcomes that changed their target.
  pub fn changed(&self) -> impl Iterator<Item = &TargetOutcome> {
    self.outcomes.iter().filter(|o| o.outcome.is_change())
  }

  pub fn has_changes(&self) -> bool {
    self.changed().next().is_some()
  }

  pub fn outcome(&self, artifact: Artifact) -> Option<Outcome> {
    self.outcomes.iter().find(|o| o.artifact == artifact).map(|o| o.outcome)
  }

  pub fn restart_required(&self) -> RestartRequired {
    let mut restart = RestartRequired::default();
    for changed in self.changed() {
      if changed.artifact.is_instrumentation() {
        restart.instrumented_apps = true;
      } else {
        restart.collector = true;
      }
    }
    restart
  }

  pub fn count(&self, outcome: Outcome) -> usize {
    self.outcomes.iter().filter(|o| o.outcome == outcome).count()
  }
}
