//! Host probes feeding [`HostFacts`](crate::facts::HostFacts).
//!
//! Each probe runs once per invocation, when the facts file is resolved.
//! Their results are part of the facts from then on.

use std::path::Path;

use tracing::debug;

use crate::consts::SYSTEMD_CONF_DIR;

/// Marker directory systemd creates when it is the running init system.
const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system";

/// Returns true when the nodejs package manager can be invoked.
pub fn nodejs_present() -> bool {
  let found = which::which("npm");
  debug!(found = ?found.as_ref().ok(), "probed for npm");
  found.is_ok()
}

/// Returns true when the host can take systemd manager drop-ins.
pub fn systemd_capable() -> bool {
  systemd_capable_at(Path::new(SYSTEMD_RUNTIME_DIR), Path::new(SYSTEMD_CONF_DIR))
}

fn systemd_capable_at(runtime_dir: &Path, conf_dir: &Path) -> bool {
  if runtime_dir.is_dir() {
    return true;
  }
  conf_dir.parent().is_some_and(Path::is_dir)
}
