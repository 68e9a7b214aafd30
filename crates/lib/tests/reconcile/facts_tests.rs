//! From a facts file to converged targets.

use zcfg_lib::ReconcileOptions;
use zcfg_lib::facts::{DeliveryMode, FactsError, FactsFile, Sdk};
use zcfg_lib::platform::Platform;
use zcfg_lib::platform::arch::Arch;
use zcfg_lib::platform::os::Os;
use zcfg_lib::plan::Artifact;
use zcfg_lib::reconcile::Outcome;

use super::common::{FixedProbe, Host};

fn linux_probe(nodejs: bool, systemd: bool) -> FixedProbe {
  FixedProbe {
    platform: Some(Platform::new(Arch::X86_64, Os::Linux)),
    nodejs,
    systemd,
  }
}

#[test]
fn systemd_scenario_end_to_end() {
  let host = Host::new();
  let path = host.temp.path().join("facts.json");
  host.write(
    &path,
    r#"{
      "version": "0.99.0",
      "mode": "systemd-wide-default",
      "sdks": ["java", "nodejs"],
      "overrides": { "OTEL_TRACES_SAMPLER": "always_on" },
      "options": { "service_name": "checkout", "enable_profiler": true }
    }"#,
  );

  let facts = FactsFile::load(&path).unwrap().resolve(&linux_probe(true, true)).unwrap();
  assert_eq!(facts.mode, DeliveryMode::Systemd);
  assert!(facts.nodejs_present);

  let report = host.reconciler.reconcile(&facts, ReconcileOptions::default()).unwrap();
  assert_eq!(report.mode, Some(DeliveryMode::Systemd));
  assert_eq!(report.outcome(Artifact::SystemdDefaults), Some(Outcome::Created));
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Java)), Some(Outcome::Unchanged));

  let dropin = host.read(&host.paths().systemd_defaults());
  assert!(dropin.contains("DefaultEnvironment=\"NODE_OPTIONS=-r /usr/lib/splunk-instrumentation/splunk-otel-js/node_modules/@splunk/otel/instrument\""));
  assert!(dropin.contains("DefaultEnvironment=\"OTEL_SERVICE_NAME=checkout\""));
  assert!(dropin.contains("DefaultEnvironment=\"SPLUNK_PROFILER_ENABLED=true\""));
  assert!(dropin.contains("DefaultEnvironment=\"OTEL_TRACES_SAMPLER=always_on\""));
  assert!(!host.paths().preload.exists());
}

#[test]
fn missing_npm_drops_nodejs() {
  let host = Host::new();
  let facts = FactsFile::from_json(r#"{ "version": "0.99.0", "mode": "zeroconfig", "sdks": ["nodejs"] }"#)
    .unwrap()
    .resolve(&linux_probe(false, false))
    .unwrap();

  let report = host.reconciler.reconcile(&facts, ReconcileOptions::default()).unwrap();
  assert_eq!(report.outcome(Artifact::ZeroConfig(Sdk::Nodejs)), Some(Outcome::Unchanged));
  assert!(!host.zeroconfig("node.conf").exists());
  assert!(!host.paths().preload.exists());
}

#[test]
fn unknown_platform_is_reported() {
  let probe = FixedProbe {
    platform: None,
    nodejs: false,
    systemd: false,
  };
  let err = FactsFile::from_json(r#"{ "version": "latest", "mode": "zeroconfig" }"#)
    .unwrap()
    .resolve(&probe)
    .unwrap_err();
  assert!(matches!(err, FactsError::UnsupportedPlatform { .. }));
}

#[test]
fn malformed_version_is_a_parse_error() {
  let host = Host::new();
  let path = host.temp.path().join("facts.json");
  host.write(&path, r#"{ "version": "one.two", "mode": "zeroconfig" }"#);
  assert!(matches!(FactsFile::load(&path), Err(FactsError::Parse { .. })));
}
