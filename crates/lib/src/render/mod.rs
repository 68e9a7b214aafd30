//! Rendering of [`EnvSet`]s into on-disk and registry encodings.
//!
//! All downstream encodings are line oriented, so every renderer rejects
//! keys and values that would break a line. Blank values are skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::EnvSet;

/// Section header systemd requires before `DefaultEnvironment` directives.
pub const SYSTEMD_MANAGER_SECTION: &str = "[Manager]";

const SYSTEMD_DIRECTIVE: &str = "DefaultEnvironment=";

/// The encoding a target stores its assignments in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
  /// `KEY=VALUE` per line.
  FlatFile,
  /// `DefaultEnvironment="KEY=VALUE"` per line under `[Manager]`.
  SystemdDefaultEnvironment,
  /// Sorted array of `KEY=VALUE` strings.
  MultiString,
}

/// A key or value that cannot be represented in a line-oriented target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid entry {key:?}: {reason}")]
pub struct InvalidValueError {
  pub key: String,
  pub reason: String,
}

impl InvalidValueError {
  fn new(key: &str, reason: &str) -> Self {
    Self {
      key: key.to_string(),
      reason: reason.to_string(),
    }
  }
}

/// Check every entry of `set` that would be rendered.
pub fn validate(set: &EnvSet) -> Result<(), InvalidValueError> {
  for (key, value) in set.present() {
    if key.is_empty() {
      return Err(InvalidValueError::new(key, "empty key"));
    }
    if key.contains('=') {
      return Err(InvalidValueError::new(key, "key contains '='"));
    }
    if has_line_break(key) {
      return Err(InvalidValueError::new(key, "key contains a line break"));
    }
    if has_line_break(value) {
      return Err(InvalidValueError::new(key, "value contains a line break"));
    }
  }
  Ok(())
}

fn has_line_break(s: &str) -> bool {
  s.contains('\n') || s.contains('\r')
}

/// Render `set` as `KEY=VALUE` lines.
pub fn render_flat(set: &EnvSet) -> Result<String, InvalidValueError> {
  validate(set)?;
  let mut out = String::new();
  for line in set.assignments() {
    out.push_str(&line);
    out.push('\n');
  }
  Ok(out)
}

/// Render `set` as a systemd `system.conf.d` drop-in.
///
/// An effectively empty set renders to an empty string, not a bare header.
pub fn render_systemd(set: &EnvSet) -> Result<String, InvalidValueError> {
  validate(set)?;
  if set.is_effectively_empty() {
    return Ok(String::new());
  }
  let mut out = String::from(SYSTEMD_MANAGER_SECTION);
  out.push('\n');
  for line in set.assignments() {
    out.push_str(&format!("{}\"{}\"\n", SYSTEMD_DIRECTIVE, line));
  }
  Ok(out)
}

/// Render `set` as the value list of a multi-string store.
pub fn render_multi_string(set: &EnvSet) -> Result<Vec<String>, InvalidValueError> {
  validate(set)?;
  Ok(set.to_sorted_assignments())
}

/// Render `set` in the text encodings. Multi-string targets are rendered one
/// value per line, which is also how the file-backed store persists them.
pub fn render(set: &EnvSet, format: Format) -> Result<String, InvalidValueError> {
  match format {
    Format::FlatFile => render_flat(set),
    Format::SystemdDefaultEnvironment => render_systemd(set),
    Format::MultiString => Ok(join_lines(&render_multi_string(set)?)),
  }
}

/// Render plain lines (the preload file).
pub fn render_lines(lines: &[String]) -> Result<String, InvalidValueError> {
  for line in lines {
    if has_line_break(line) {
      return Err(InvalidValueError::new(line, "line contains a line break"));
    }
  }
  Ok(join_lines(lines))
}

fn join_lines(lines: &[String]) -> String {
  let mut out = String::new();
  for line in lines {
    out.push_str(line);
    out.push('\n');
  }
  out
}

/// Parse `KEY=VALUE` lines, skipping blanks, comments and section headers.
pub fn parse_flat(content: &str) -> EnvSet {
  EnvSet::from_assignments(content.lines().map(str::trim).filter(|l| !is_ignorable(l)))
}

/// Parse `DefaultEnvironment=` directives from a systemd drop-in.
///
/// A directive may carry several quoted or bare assignments separated by
/// whitespace, as systemd allows.
pub fn parse_systemd(content: &str) -> EnvSet {
  let mut set = EnvSet::new();
  for line in content.lines().map(str::trim) {
    let Some(rest) = line.strip_prefix(SYSTEMD_DIRECTIVE) else {
      continue;
    };
    set.extend(EnvSet::from_assignments(split_systemd_words(rest)).iter());
  }
  set
}

/// Parse `content` according to `format`.
pub fn parse(content: &str, format: Format) -> EnvSet {
  match format {
    Format::FlatFile | Format::MultiString => parse_flat(content),
    Format::SystemdDefaultEnvironment => parse_systemd(content),
  }
}

fn is_ignorable(line: &str) -> bool {
  line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[')
}

fn split_systemd_words(s: &str) -> Vec<String> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut quoted = false;
  for c in s.chars() {
    match c {
      '"' => quoted = !quoted,
      c if c.is_whitespace() && !quoted => {
        if !current.is_empty() {
          words.push(std::mem::take(&mut current));
        }
      }
      c => current.push(c),
    }
  }
  if !current.is_empty() {
    words.push(current);
  }
  words
}
