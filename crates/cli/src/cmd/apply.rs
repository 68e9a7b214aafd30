//! Implementation of the `zcfg apply` command.
//!
//! Holds the exclusive run lock while it converges every target, then saves
//! the report for `zcfg status`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use zcfg_lib::ReconcileOptions;
use zcfg_lib::lock::{LockMode, RunLock};
use zcfg_lib::platform::paths::data_dir;
use zcfg_lib::reconcile::ReportStore;

use crate::output::{OutputFormat, print_json, print_report, print_success, summary};

/// Execute the apply command.
///
/// Nothing is written when the facts fail to resolve or a value fails
/// validation. A failure while writing stops the run; targets already
/// converged keep their new content and the report is not saved.
pub fn cmd_apply(facts: &Path, output: OutputFormat) -> Result<()> {
  let facts = super::load_facts(facts)?;
  let data_dir = data_dir();

  let _lock = RunLock::acquire(&data_dir, LockMode::Exclusive, "apply").context("Failed to acquire run lock")?;

  let reconciler = super::reconciler();
  let report = reconciler
    .reconcile(&facts, ReconcileOptions::default())
    .context("Apply failed")?;

  let store = ReportStore::new(data_dir);
  store.save(&report).context("Failed to save report")?;
  info!(path = %store.report_path().display(), "saved report");

  if output.is_json() {
    return print_json(&report);
  }

  print_report(&report);
  println!();
  print_success(&format!("Apply complete: {}", summary(&report)));
  Ok(())
}
