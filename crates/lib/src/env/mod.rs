//! Ordered, deduplicated environment variable assignments.
//!
//! [`EnvSet`] is what every other part of the crate exchanges: the planner
//! builds one per artifact, the formatters render them, and the store merger
//! reads existing stores back into one.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Returns true when a value counts as "unset".
///
/// Empty and whitespace-only values are kept in the set (so they can mask an
/// earlier value) but are never rendered.
pub fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

/// An insertion-ordered set of `KEY=VALUE` assignments with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvSet {
  entries: Vec<(String, String)>,
}

impl EnvSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or overwrite `key`.
  ///
  /// An existing key keeps the position of its first insertion.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((key, value)),
    }
  }

  /// Remove `key`, returning its value if present.
  pub fn remove(&mut self, key: &str) -> Option<String> {
    let idx = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(idx).1)
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.iter().any(|(k, _)| k == key)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// True when no entry would survive rendering.
  pub fn is_effectively_empty(&self) -> bool {
    self.entries.iter().all(|(_, v)| is_blank(v))
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Entries that will be rendered, in insertion order.
  pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
    self.iter().filter(|(_, v)| !is_blank(v))
  }

  /// `KEY=VALUE` strings in insertion order, blank values omitted.
  pub fn assignments(&self) -> Vec<String> {
    self.present().map(|(k, v)| format!("{}={}", k, v)).collect()
  }

  /// `KEY=VALUE` strings sorted case-insensitively by the whole assignment.
  ///
  /// This is the ordering multi-valued stores are written in, so a store can
  /// be compared against a previous snapshot regardless of insertion order.
  pub fn to_sorted_assignments(&self) -> Vec<String> {
    let mut out = self.assignments();
    out.sort_by(|a, b| compare_assignments(a, b));
    out
  }

  /// Build a set from `KEY=VALUE` strings.
  ///
  /// Strings without `=` or with an empty key are skipped. A repeated key
  /// keeps its first position and its last value.
  pub fn from_assignments<I, S>(assignments: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut set = Self::new();
    for assignment in assignments {
      if let Some((key, value)) = assignment.as_ref().split_once('=')
        && !key.trim().is_empty()
      {
        set.set(key.trim(), value);
      }
    }
    set
  }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for EnvSet {
  fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
    for (k, v) in iter {
      self.set(k, v);
    }
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSet {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut set = Self::new();
    set.extend(iter);
    set
  }
}

impl fmt::Display for EnvSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.assignments().join(" "))
  }
}

pub(crate) fn compare_assignments(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
