use std::path::{Path, PathBuf};

use crate::consts::{
  APP_NAME, COLLECTOR_ENV_PATH, DATA_DIR_ENV, INSTRUMENTATION_CONFIG_PATH, PRELOAD_PATH, ROOT_ENV, SYSTEMD_CONF_DIR,
  SYSTEMD_CONF_FILENAME, ZEROCONFIG_DIR,
};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from(r"C:\"))
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

/// Returns the directory holding the run lock and the last report.
///
/// `ZCFG_DATA_DIR` wins over the platform default.
pub fn data_dir() -> PathBuf {
  if let Ok(dir) = std::env::var(DATA_DIR_ENV)
    && !dir.is_empty()
  {
    return PathBuf::from(dir);
  }
  default_data_dir()
}

#[cfg(windows)]
fn default_data_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
    .join(APP_NAME)
}

#[cfg(not(windows))]
fn default_data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Returns the prefix from `ZCFG_ROOT`, if set.
pub fn root_prefix() -> Option<PathBuf> {
  std::env::var(ROOT_ENV).ok().filter(|r| !r.is_empty()).map(PathBuf::from)
}

/// Re-anchor an absolute path under `root`.
pub fn rooted(root: Option<&Path>, absolute: &str) -> PathBuf {
  match root {
    Some(root) => root.join(absolute.trim_start_matches('/')),
    None => PathBuf::from(absolute),
  }
}

/// Well-known locations of every file artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
  pub instrumentation_config: PathBuf,
  pub zeroconfig_dir: PathBuf,
  pub systemd_conf_dir: PathBuf,
  pub preload: PathBuf,
  pub collector_env: PathBuf,
}

impl TargetPaths {
  /// Paths anchored at `root`, or at `/` when `None`.
  pub fn new(root: Option<&Path>) -> Self {
    Self {
      instrumentation_config: rooted(root, INSTRUMENTATION_CONFIG_PATH),
      zeroconfig_dir: rooted(root, ZEROCONFIG_DIR),
      systemd_conf_dir: rooted(root, SYSTEMD_CONF_DIR),
      preload: rooted(root, PRELOAD_PATH),
      collector_env: rooted(root, COLLECTOR_ENV_PATH),
    }
  }

  /// Paths honoring `ZCFG_ROOT`.
  pub fn from_env() -> Self {
    Self::new(root_prefix().as_deref())
  }

  pub fn systemd_defaults(&self) -> PathBuf {
    self.systemd_conf_dir.join(SYSTEMD_CONF_FILENAME)
  }

  pub fn zeroconfig(&self, file_name: &str) -> PathBuf {
    self.zeroconfig_dir.join(file_name)
  }
}

impl Default for TargetPaths {
  fn default() -> Self {
    Self::new(None)
  }
}
