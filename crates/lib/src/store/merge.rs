//! Additive merges into stores other programs also write.

use crate::env::{EnvSet, compare_assignments, is_blank};
use crate::plan::LineSet;

/// Merge `additions` into `existing`.
///
/// Keys compare case-insensitively. A colliding entry is overwritten in
/// place and any later spellings of the same key are dropped. New keys are
/// appended and a blank addition removes the key.
/// Entries not named in `additions` are kept untouched.
pub fn merge(existing: &EnvSet, additions: &EnvSet) -> EnvSet {
  let mut merged: Vec<(String, String)> = existing.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

  for (key, value) in additions.iter() {
    let blank = is_blank(value);
    let mut kept_first = false;
    merged.retain(|(k, _)| {
      if !k.eq_ignore_ascii_case(key) {
        return true;
      }
      let keep = !blank && !kept_first;
      kept_first = true;
      keep
    });

    if blank {
      continue;
    }
    match merged.iter().position(|(k, _)| k.eq_ignore_ascii_case(key)) {
      Some(idx) => merged[idx] = (key.to_string(), value.to_string()),
      None => merged.push((key.to_string(), value.to_string())),
    }
  }

  merged.into_iter().collect()
}

/// Merge `additions` into the raw values of a multi-string store.
///
/// Only values whose key collides with an addition are touched: the first is
/// replaced by the addition (or removed when the addition is blank) and later
/// spellings are dropped. Every other value is carried verbatim, including
/// `KEY=` and entries with no `=` at all. The result is sorted.
pub fn merge_values(existing: &[String], additions: &EnvSet) -> Vec<String> {
  let mut merged: Vec<String> = Vec::with_capacity(existing.len() + additions.len());
  let mut placed: Vec<&str> = Vec::new();

  for value in existing.iter().filter(|v| !v.is_empty()) {
    let colliding = value
      .split_once('=')
      .map(|(k, _)| k.trim())
      .filter(|k| !k.is_empty())
      .and_then(|k| additions.iter().find(|(a, _)| a.eq_ignore_ascii_case(k)));

    match colliding {
      None => merged.push(value.clone()),
      Some((key, _)) if placed.iter().any(|p| p.eq_ignore_ascii_case(key)) => {}
      Some((key, addition)) => {
        placed.push(key);
        if !is_blank(addition) {
          merged.push(format!("{}={}", key, addition));
        }
      }
    }
  }

  for (key, value) in additions.iter() {
    if !is_blank(value) && !placed.iter().any(|p| p.eq_ignore_ascii_case(key)) {
      merged.push(format!("{}={}", key, value));
    }
  }

  merged.sort_by(|a, b| compare_assignments(a, b));
  merged
}

/// Apply `lines` to the existing content of a line-oriented file.
///
/// Foreign lines keep their order. Managed lines that are no longer wanted
/// are dropped, duplicates collapse to their first occurrence, and wanted
/// lines not yet present are appended. Blank lines are dropped.
pub fn merge_lines(existing: &str, lines: &LineSet) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for line in existing.lines() {
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }
    let managed = lines.managed.iter().any(|m| m == trimmed);
    let wanted = lines.wanted.iter().any(|w| w == trimmed);
    if managed && !wanted {
      continue;
    }
    if out.iter().any(|o| o.trim() == trimmed) {
      continue;
    }
    out.push(line.to_string());
  }

  for line in &lines.wanted {
    if !out.iter().any(|o| o.trim() == line) {
      out.push(line.clone());
    }
  }
  out
}
