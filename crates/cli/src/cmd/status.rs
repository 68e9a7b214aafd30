//! Status command implementation.
//!
//! Displays the report saved by the last `zcfg apply`.

use anyhow::{Context, Result};

use zcfg_lib::lock::{LockMode, RunLock};
use zcfg_lib::platform::paths::data_dir;
use zcfg_lib::reconcile::ReportStore;

use crate::output::{
  OutputFormat, format_timestamp, print_info, print_json, print_outcome, print_report, print_stat, print_success, summary,
};

pub fn cmd_status(verbose: bool, output: OutputFormat) -> Result<()> {
  let data_dir = data_dir();
  let _lock = RunLock::acquire(&data_dir, LockMode::Shared, "status").context("Failed to acquire run lock")?;

  let store = ReportStore::new(data_dir);
  let report = store.load().context("Failed to load last report")?;

  if output.is_json() {
    return print_json(&report);
  }

  let Some(report) = report else {
    print_info("No report found. Run 'zcfg apply' to create one.");
    return Ok(());
  };

  print_success(&format!("Last apply: agent {}", report.agent_version));
  print_stat("Applied at", &format_timestamp(report.generated_at_unix));
  print_stat("Mode", report.mode.map(|m| m.as_str()).unwrap_or("unmanaged"));
  print_stat("Targets", &report.outcomes.len().to_string());
  print_stat("Result", &summary(&report));

  println!();
  if verbose {
    print_report(&report);
  } else {
    for outcome in report.changed() {
      print_outcome(outcome);
    }
  }
  Ok(())
}
