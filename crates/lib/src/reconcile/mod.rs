//! Converging targets onto a plan.
//!
//! A run has three phases:
//!
//! 1. Plan the directives from the facts.
//! 2. Render every payload, so a malformed value aborts before any target
//!    is touched.
//! 3. For each directive: read the target, compute its new content, and
//!    write or delete only when the bytes differ.
//!
//! Running twice with the same facts leaves every target `Unchanged`.

mod report;
mod storage;

use tracing::{debug, info};

use crate::env::EnvSet;
use crate::error::ReconcileError;
use crate::facts::InstrumentationFacts;
use crate::plan::{self, Action, Directive, Ownership, Payload, Plan};
use crate::platform::paths::TargetPaths;
use crate::render::{self, Format};
use crate::store::{Content, StoreMerger, merge, merge_lines, merge_values};
use crate::util::hash::hash_bytes;

pub use report::{Outcome, REPORT_VERSION, ReconcileReport, RestartRequired, TargetOutcome};
pub use storage::{ReportError, ReportStore};

/// Options for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
  /// Compute outcomes without writing anything.
  pub dry_run: bool,
}

/// Applies plans to the targets under a set of [`TargetPaths`].
#[derive(Debug)]
pub struct Reconciler {
  paths: TargetPaths,
  store: StoreMerger,
}

impl Reconciler {
  pub fn new(paths: TargetPaths, store: StoreMerger) -> Self {
    Self { paths, store }
  }

  pub fn paths(&self) -> &TargetPaths {
    &self.paths
  }

  pub fn store(&self) -> &StoreMerger {
    &self.store
  }

  pub fn plan(&self, facts: &InstrumentationFacts) -> Result<Plan, ReconcileError> {
    plan::plan(facts, &self.paths)
  }

  /// Converge every target onto the plan for `facts`.
  pub fn reconcile(
    &self,
    facts: &InstrumentationFacts,
    options: ReconcileOptions,
  ) -> Result<ReconcileReport, ReconcileError> {
    let plan = self.plan(facts)?;
    plan.validate()?;

    let mut report = ReconcileReport::new(facts.version.to_string(), plan.mode, options.dry_run);
    for directive in &plan.directives {
      let outcome = self.apply(directive, options)?;
      report.outcomes.push(outcome);
    }

    debug!(
      changed = report.changed().count(),
      total = report.outcomes.len(),
      dry_run = options.dry_run,
      "reconcile finished"
    );
    Ok(report)
  }

  fn apply(&self, directive: &Directive, options: ReconcileOptions) -> Result<TargetOutcome, ReconcileError> {
    let target = &directive.target;
    let current = self.store.read(target)?;
    let desired = self.desired(directive, current.as_ref())?;

    let outcome = match (&current, &desired) {
      (None, None) => Outcome::Unchanged,
      (Some(_), None) => Outcome::Deleted,
      (None, Some(_)) => Outcome::Created,
      (Some(old), Some(new)) if old.to_bytes() == new.to_bytes() => Outcome::Unchanged,
      (Some(_), Some(_)) => Outcome::Updated,
    };
    debug!(artifact = %directive.artifact, target = %target, outcome = outcome.as_str(), "compared");

    let digest = desired.as_ref().map(|c| hash_bytes(&c.to_bytes()));
    if outcome.is_change() {
      info!(
        artifact = %directive.artifact,
        target = %target,
        outcome = outcome.as_str(),
        dry_run = options.dry_run,
        "target changed"
      );
    }

    if !options.dry_run {
      match (outcome, desired) {
        (Outcome::Created | Outcome::Updated, Some(content)) => self.store.write(target, content)?,
        (Outcome::Deleted, _) => {
          self.store.delete(target)?;
        }
        _ => {}
      }
    }

    Ok(TargetOutcome {
      artifact: directive.artifact,
      target: target.clone(),
      outcome,
      digest,
    })
  }

  /// Content `directive` wants its target to hold; `None` means absent.
  fn desired(&self, directive: &Directive, current: Option<&Content>) -> Result<Option<Content>, ReconcileError> {
    let format = directive.format();
    let content = match &directive.action {
      Action::Delete => return Ok(None),
      Action::Write(Payload::Env(env)) if directive.ownership == Ownership::Shared && format == Format::MultiString => {
        render::render_multi_string(env).map_err(|e| directive.invalid(e))?;
        let existing = current.cloned().map(Content::into_values).unwrap_or_default();
        Content::Values(merge_values(&existing, env))
      }
      Action::Write(Payload::Env(env)) => {
        let env = match directive.ownership {
          Ownership::Owned => env.clone(),
          Ownership::Shared => {
            let existing = match current {
              None => EnvSet::new(),
              Some(Content::Text(text)) => render::parse(text, format),
              Some(Content::Values(values)) => EnvSet::from_assignments(values),
            };
            merge(&existing, env)
          }
        };
        match format {
          Format::MultiString => Content::Values(render::render_multi_string(&env).map_err(|e| directive.invalid(e))?),
          _ => Content::Text(render::render(&env, format).map_err(|e| directive.invalid(e))?),
        }
      }
      Action::Write(Payload::Lines(lines)) => {
        let existing = match current {
          Some(Content::Text(text)) => text.as_str(),
          _ => "",
        };
        let merged = merge_lines(existing, lines);
        Content::Text(render::render_lines(&merged).map_err(|e| directive.invalid(e))?)
      }
    };

    // An empty artifact is never written; one that became empty is removed.
    Ok((!content.is_empty()).then_some(content))
  }
}
