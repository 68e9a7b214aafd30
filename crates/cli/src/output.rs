//! CLI output formatting utilities.
//!
//! Colored status messages, outcome markers, and JSON output.

use std::time::{Duration, UNIX_EPOCH};

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use zcfg_lib::reconcile::{Outcome, ReconcileReport, TargetOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
  pub const SAME: &str = "=";
}

/// Length of the digest prefix shown next to a target.
const DIGEST_LEN: usize = 12;

pub fn outcome_symbol(outcome: Outcome) -> &'static str {
  match outcome {
    Outcome::Created => symbols::ADD,
    Outcome::Updated => symbols::MODIFY,
    Outcome::Deleted => symbols::REMOVE,
    Outcome::Unchanged => symbols::SAME,
  }
}

/// RFC 3339 rendering of a report timestamp.
pub fn format_timestamp(unix_secs: u64) -> String {
  humantime::format_rfc3339_seconds(UNIX_EPOCH + Duration::from_secs(unix_secs)).to_string()
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_outcome(outcome: &TargetOutcome) {
  let symbol = outcome_symbol(outcome.outcome);
  let digest = outcome
    .digest
    .as_ref()
    .map(|d| format!(" ({})", d.short(DIGEST_LEN)))
    .unwrap_or_default();
  let line = format!("{} {} {}{}", symbol, outcome.artifact, outcome.target, digest);
  match outcome.outcome {
    Outcome::Created => println!("  {}", line.if_supports_color(Stream::Stdout, |s| s.green())),
    Outcome::Updated => println!("  {}", line.if_supports_color(Stream::Stdout, |s| s.yellow())),
    Outcome::Deleted => println!("  {}", line.if_supports_color(Stream::Stdout, |s| s.red())),
    Outcome::Unchanged => println!("  {}", line.if_supports_color(Stream::Stdout, |s| s.dimmed())),
  }
}

/// Counts line, e.g. `1 created, 0 updated, 2 deleted, 3 unchanged`.
pub fn summary(report: &ReconcileReport) -> String {
  format!(
    "{} created, {} updated, {} deleted, {} unchanged",
    report.count(Outcome::Created),
    report.count(Outcome::Updated),
    report.count(Outcome::Deleted),
    report.count(Outcome::Unchanged)
  )
}

/// Per-target lines followed by restart hints.
pub fn print_report(report: &ReconcileReport) {
  for outcome in &report.outcomes {
    print_outcome(outcome);
  }

  let restart = report.restart_required();
  if restart.collector {
    print_warning("Restart the collector service to pick up the new environment");
  }
  if restart.instrumented_apps {
    print_warning("Restart instrumented applications to pick up the new configuration");
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
