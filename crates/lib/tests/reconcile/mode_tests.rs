//! Switching delivery modes between runs.

use zcfg_lib::ReconcileOptions;
use zcfg_lib::facts::{DeliveryMode, Sdk};
use zcfg_lib::plan::Artifact;
use zcfg_lib::reconcile::Outcome;

use super::common::{Host, LIBSPLUNK, facts};

#[test]
fn zeroconfig_to_systemd_removes_preload_artifacts() {
  let host = Host::new();
  let r = &host.reconciler;
  let zeroconfig = facts("0.99.0", DeliveryMode::Zeroconfig).with_sdks([Sdk::Java, Sdk::Dotnet]);
  r.reconcile(&zeroconfig, ReconcileOptions::default()).unwrap();
  assert!(host.zeroconfig("java.conf").exists());
  assert!(host.zeroconfig("dotnet.conf").exists());
  assert_eq!(host.read(&host.paths().preload), format!("{}\n", LIBSPLUNK));

  let systemd = facts("0.99.0", DeliveryMode::Systemd).with_sdks([Sdk::Java, Sdk::Dotnet]);
  let report = r.reconcile(&systemd, ReconcileOptions::default()).unwrap();

  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Java)), Some(Outcome::Deleted));
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Dotnet)), Some(Outcome::Deleted));
  assert_eq!(report.outcome(Artifact::SystemdDefaults), Some(Outcome::Created));
  assert_eq!(report.outcome(Artifact::Preload), Some(Outcome::Deleted));
  assert!(!host.zeroconfig("java.conf").exists());
  assert!(!host.paths().preload.exists());

  let dropin = host.read(&host.paths().systemd_defaults());
  assert!(dropin.starts_with("[Manager]\n"));
  assert!(dropin.contains("DefaultEnvironment=\"JAVA_TOOL_OPTIONS=-javaagent:"));
  assert!(dropin.contains("DefaultEnvironment=\"CORECLR_ENABLE_PROFILING=1\""));
  // The common block appears once, after every SDK.
  assert_eq!(dropin.matches("OTEL_RESOURCE_ATTRIBUTES=").count(), 1);
  assert!(dropin.contains("splunk-otel-auto-instrumentation-0.99.0-systemd"));
}

#[test]
fn systemd_to_zeroconfig_removes_drop_in() {
  let host = Host::new();
  let r = &host.reconciler;
  r.reconcile(&facts("0.99.0", DeliveryMode::Systemd), ReconcileOptions::default())
    .unwrap();
  assert!(host.paths().systemd_defaults().exists());

  let report = r
    .reconcile(&facts("0.99.0", DeliveryMode::Zeroconfig), ReconcileOptions::default())
    .unwrap();
  assert_eq!(report.outcome(Artifact::SystemdDefaults), Some(Outcome::Deleted));
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Java)), Some(Outcome::Created));
  assert!(!host.paths().systemd_defaults().exists());
}

#[test]
fn agent_upgrade_moves_legacy_config_to_zeroconfig() {
  let host = Host::new();
  let r = &host.reconciler;
  r.reconcile(&facts("0.86.0", DeliveryMode::Zeroconfig), ReconcileOptions::default())
    .unwrap();
  let legacy = host.read(&host.paths().instrumentation_config);
  assert!(legacy.contains("java_agent_jar=/usr/lib/splunk-instrumentation/splunk-otel-javaagent.jar\n"));
  assert!(!host.zeroconfig("java.conf").exists());

  let report = r
    .reconcile(&facts("0.99.0", DeliveryMode::Zeroconfig), ReconcileOptions::default())
    .unwrap();
  assert_eq!(report.outcome(Artifact::LegacyConfig), Some(Outcome::Deleted));
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Java)), Some(Outcome::Created));
  // libsplunk stays in the preload file across the switch.
  assert_eq!(report.outcome(Artifact::Preload), Some(Outcome::Unchanged));
}

#[test]
fn no_qualifying_sdk_in_systemd_mode_leaves_no_drop_in() {
  let host = Host::new();
  let f = facts("0.99.0", DeliveryMode::Systemd).with_sdks([Sdk::Nodejs]);
  let report = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();
  assert_eq!(report.outcome(Artifact::SystemdDefaults), Some(Outcome::Unchanged));
  assert!(!host.paths().systemd_defaults().exists());
}

#[test]
fn package_revision_of_gate_release_uses_zeroconfig() {
  let host = Host::new();
  let report = host
    .reconciler
    .reconcile(&facts("0.87.0-1", DeliveryMode::Zeroconfig), ReconcileOptions::default())
    .unwrap();
  assert_eq!(report.mode, Some(DeliveryMode::Zeroconfig));
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Java)), Some(Outcome::Created));
  assert!(!host.paths().instrumentation_config.exists());
  let java = host.read(&host.zeroconfig("java.conf"));
  assert!(java.contains("splunk.zc.method=splunk-otel-auto-instrumentation-0.87.0-1"));
}
