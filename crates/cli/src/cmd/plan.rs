//! Implementation of the `zcfg plan` command.
//!
//! Resolves the facts file and runs the reconciler in dry-run mode, so every
//! outcome is what `apply` would do right now.

use std::path::Path;

use anyhow::{Context, Result};

use zcfg_lib::ReconcileOptions;

use crate::output::{OutputFormat, print_info, print_json, print_report, print_stat, summary};

pub fn cmd_plan(facts: &Path, output: OutputFormat) -> Result<()> {
  let facts = super::load_facts(facts)?;
  let reconciler = super::reconciler();

  let report = reconciler
    .reconcile(&facts, ReconcileOptions { dry_run: true })
    .context("Failed to plan")?;

  if output.is_json() {
    return print_json(&report);
  }

  print_info(&format!("Plan for agent {}", report.agent_version));
  print_stat("Mode", report.mode.map(|m| m.as_str()).unwrap_or("unmanaged"));
  println!();
  print_report(&report);
  println!();
  if report.has_changes() {
    println!("Plan: {}", summary(&report));
  } else {
    println!("No changes. Every target is up to date.");
  }
  Ok(())
}
