use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use zcfg_lib::platform::Platform;
use zcfg_lib::platform::paths::{TargetPaths, data_dir, root_prefix};
use zcfg_lib::platform::probe;

use crate::output::{OutputFormat, print_json, print_stat, print_warning};

#[derive(Serialize)]
struct Info {
  platform: Option<String>,
  nodejs_present: bool,
  systemd_capable: bool,
  root: Option<PathBuf>,
  data_dir: PathBuf,
  registry_backend: &'static str,
  targets: Targets,
}

#[derive(Serialize)]
struct Targets {
  instrumentation_config: PathBuf,
  zeroconfig_dir: PathBuf,
  systemd_defaults: PathBuf,
  preload: PathBuf,
  collector_env: PathBuf,
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let paths = TargetPaths::from_env();
  let data_dir = data_dir();
  let info = Info {
    platform: Platform::current().map(|p| p.triple()),
    nodejs_present: probe::nodejs_present(),
    systemd_capable: probe::systemd_capable(),
    root: root_prefix(),
    registry_backend: super::reconciler().store().backend(),
    targets: Targets {
      instrumentation_config: paths.instrumentation_config.clone(),
      zeroconfig_dir: paths.zeroconfig_dir.clone(),
      systemd_defaults: paths.systemd_defaults(),
      preload: paths.preload.clone(),
      collector_env: paths.collector_env.clone(),
    },
    data_dir,
  };

  if output.is_json() {
    return print_json(&info);
  }

  println!("System:");
  match &info.platform {
    Some(triple) => print_stat("Platform", triple),
    None => print_warning("Could not detect platform."),
  }
  print_stat("nodejs (npm)", yes_no(info.nodejs_present));
  print_stat("systemd", yes_no(info.systemd_capable));
  println!();
  println!("Paths:");
  if let Some(root) = &info.root {
    print_stat("Root", &root.display().to_string());
  }
  print_stat("Data", &info.data_dir.display().to_string());
  print_stat("Registry backend", info.registry_backend);
  print_stat("Instrumentation config", &info.targets.instrumentation_config.display().to_string());
  print_stat("Zeroconfig", &info.targets.zeroconfig_dir.display().to_string());
  print_stat("Systemd defaults", &info.targets.systemd_defaults.display().to_string());
  print_stat("Preload", &info.targets.preload.display().to_string());
  print_stat("Collector env", &info.targets.collector_env.display().to_string());
  Ok(())
}

fn yes_no(value: bool) -> &'static str {
  if value { "yes" } else { "no" }
}
