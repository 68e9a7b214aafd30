//! Persistence of the last reconciliation report.
//!
//! # Storage Layout
//!
//! ```text
//! {data_dir}/
//! ├── .lock               # RunLock
//! └── last-report.json    # ReconcileReport of the last apply
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::REPORT_FILENAME;
use crate::platform::paths::data_dir;
use crate::store::file::write_atomic;

use super::report::{REPORT_VERSION, ReconcileReport};

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("failed to read report: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write report: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse report: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize report: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported report version {0}")]
  UnsupportedVersion(u32),
}

/// Stores the report of the most recent apply.
#[derive(Debug, Clone)]
pub struct ReportStore {
  base_path: PathBuf,
}

impl ReportStore {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  /// Store in the data directory (`ZCFG_DATA_DIR` or the platform default).
  pub fn default_store() -> Self {
    Self::new(data_dir())
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  pub fn report_path(&self) -> PathBuf {
    self.base_path.join(REPORT_FILENAME)
  }

  /// Load the last report. Returns `Ok(None)` if nothing was applied yet.
  pub fn load(&self) -> Result<Option<ReconcileReport>, ReportError> {
    let content = match fs::read_to_string(self.report_path()) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(ReportError::Read(e)),
    };

    let report: ReconcileReport = serde_json::from_str(&content).map_err(ReportError::Parse)?;
    if report.version != REPORT_VERSION {
      return Err(ReportError::UnsupportedVersion(report.version));
    }
    Ok(Some(report))
  }

  /// Save `report`, replacing the previous one atomically.
  pub fn save(&self, report: &ReconcileReport) -> Result<(), ReportError> {
    let content = serde_json::to_string_pretty(report).map_err(ReportError::Serialize)?;
    write_atomic(&self.report_path(), &content).map_err(ReportError::Write)
  }
}
