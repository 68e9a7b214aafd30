use std::io;

use thiserror::Error;

use crate::plan::{Artifact, Target};

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error("invalid value for {artifact}, key {key:?}: {reason}")]
  InvalidValue {
    artifact: Artifact,
    key: String,
    reason: String,
  },

  #[error("precondition failed: {reason}")]
  Precondition { reason: String },

  #[error("failed to read {target}: {source}")]
  StoreRead {
    target: Target,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {target}: {source}")]
  StoreWrite {
    target: Target,
    #[source]
    source: io::Error,
  },
}

impl ReconcileError {
  pub(crate) fn read(target: &Target, source: io::Error) -> Self {
    Self::StoreRead {
      target: target.clone(),
      source,
    }
  }

  pub(crate) fn write(target: &Target, source: io::Error) -> Self {
    Self::StoreWrite {
      target: target.clone(),
      source,
    }
  }
}
