mod apply;
mod info;
mod plan;
mod status;

pub use apply::cmd_apply;
pub use info::cmd_info;
pub use plan::cmd_plan;
pub use status::cmd_status;

use std::path::Path;

use anyhow::{Context, Result};

use zcfg_lib::facts::{FactsFile, SystemProbe};
use zcfg_lib::platform::paths::{TargetPaths, data_dir};
use zcfg_lib::store::StoreMerger;
use zcfg_lib::{InstrumentationFacts, Reconciler};

/// Directory, under the data dir, emulating the registry off Windows.
const REGISTRY_DIR: &str = "registry";

fn load_facts(path: &Path) -> Result<InstrumentationFacts> {
  FactsFile::load(path)
    .and_then(|file| file.resolve(&SystemProbe))
    .with_context(|| format!("Failed to load facts: {}", path.display()))
}

fn reconciler() -> Reconciler {
  Reconciler::new(
    TargetPaths::from_env(),
    StoreMerger::for_host(data_dir().join(REGISTRY_DIR)),
  )
}
