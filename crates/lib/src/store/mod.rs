//! Reading and writing artifact targets.
//!
//! Files are replaced atomically. Registry targets go through a
//! [`MultiStringStore`] backend so the reconciler never touches the Win32
//! API directly.

pub mod file;
mod merge;
pub mod multi_string;

use std::path::PathBuf;

use crate::env::EnvSet;
use crate::error::ReconcileError;
use crate::plan::Target;
use crate::render::{self, Format};

pub use merge::{merge, merge_lines, merge_values};
pub use multi_string::{FileMultiStringStore, MultiStringStore};
#[cfg(windows)]
pub use multi_string::WindowsRegistry;

/// Current or rendered content of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
  /// File bytes.
  Text(String),
  /// Multi-string values.
  Values(Vec<String>),
}

impl Content {
  /// Canonical bytes, used for comparison and digests.
  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      Self::Text(text) => text.as_bytes().to_vec(),
      Self::Values(values) => values.iter().flat_map(|v| v.bytes().chain(std::iter::once(0))).collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    match self {
      Self::Text(text) => text.is_empty(),
      Self::Values(values) => values.is_empty(),
    }
  }

  fn into_text(self) -> String {
    match self {
      Self::Text(text) => text,
      Self::Values(values) => values.iter().map(|v| format!("{}\n", v)).collect(),
    }
  }

  pub(crate) fn into_values(self) -> Vec<String> {
    match self {
      Self::Text(text) => text.lines().map(str::to_string).collect(),
      Self::Values(values) => values,
    }
  }
}

/// Read, write and merge access to every kind of target.
pub struct StoreMerger {
  multi: Box<dyn MultiStringStore>,
}

impl StoreMerger {
  pub fn new(multi: Box<dyn MultiStringStore>) -> Self {
    Self { multi }
  }

  /// The registry on Windows, a file emulation under `fallback_root` elsewhere.
  pub fn for_host(fallback_root: impl Into<PathBuf>) -> Self {
    #[cfg(windows)]
    {
      let _: PathBuf = fallback_root.into();
      Self::new(Box::new(WindowsRegistry))
    }
    #[cfg(not(windows))]
    {
      Self::new(Box::new(FileMultiStringStore::new(fallback_root)))
    }
  }

  pub fn backend(&self) -> &'static str {
    self.multi.name()
  }

  /// Raw content of `target`; `None` when it does not exist.
  pub fn read(&self, target: &Target) -> Result<Option<Content>, ReconcileError> {
    match target {
      Target::File(path) => file::read_optional(path)
        .map(|c| c.map(Content::Text))
        .map_err(|e| ReconcileError::read(target, e)),
      Target::Registry { key, value } => self
        .multi
        .read(key, value)
        .map(|v| v.map(Content::Values))
        .map_err(|e| ReconcileError::read(target, e)),
    }
  }

  /// Parse the current content of `target`. A missing target is empty.
  pub fn read_current(&self, target: &Target, format: Format) -> Result<EnvSet, ReconcileError> {
    Ok(match self.read(target)? {
      None => EnvSet::new(),
      Some(Content::Text(text)) => render::parse(&text, format),
      Some(Content::Values(values)) => EnvSet::from_assignments(values),
    })
  }

  pub fn write(&self, target: &Target, content: Content) -> Result<(), ReconcileError> {
    match target {
      Target::File(path) => file::write_atomic(path, &content.into_text()),
      Target::Registry { key, value } => self.multi.write(key, value, &content.into_values()),
    }
    .map_err(|e| ReconcileError::write(target, e))
  }

  /// Remove `target`, returning whether it existed.
  pub fn delete(&self, target: &Target) -> Result<bool, ReconcileError> {
    match target {
      Target::File(path) => file::remove_if_exists(path),
      Target::Registry { key, value } => self.multi.delete(key, value),
    }
    .map_err(|e| ReconcileError::write(target, e))
  }
}

impl std::fmt::Debug for StoreMerger {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StoreMerger").field("backend", &self.multi.name()).finish()
  }
}
