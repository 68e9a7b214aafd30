//! Collector environment on both platforms.

use std::collections::BTreeMap;

use zcfg_lib::ReconcileOptions;
use zcfg_lib::consts::{COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE};
use zcfg_lib::facts::{DeliveryMode, HostFacts};
use zcfg_lib::platform::arch::Arch;
use zcfg_lib::platform::os::Os;
use zcfg_lib::plan::Artifact;
use zcfg_lib::reconcile::Outcome;
use zcfg_lib::store::MultiStringStore;

use super::common::{Host, facts};

fn collector(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
  Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

fn windows_facts(pairs: &[(&str, &str)]) -> zcfg_lib::InstrumentationFacts {
  let mut f = facts("0.99.0", DeliveryMode::Zeroconfig);
  f.host = HostFacts {
    os: Os::Windows,
    arch: Arch::X86_64,
    systemd_capable: false,
  };
  f.collector = collector(pairs);
  f
}

#[test]
fn registry_merge_keeps_unrelated_entries() {
  let host = Host::new();
  let registry = host.registry();
  registry
    .write(
      COLLECTOR_SERVICE_KEY,
      COLLECTOR_SERVICE_VALUE,
      &["splunk_realm=eu0".to_string(), "UNRELATED=keep".to_string()],
    )
    .unwrap();

  let f = windows_facts(&[("SPLUNK_REALM", "us0"), ("SPLUNK_ACCESS_TOKEN", "t")]);
  let report = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();

  assert_eq!(report.mode, None);
  assert_eq!(report.outcomes.len(), 1);
  assert_eq!(report.outcome(Artifact::CollectorEnv), Some(Outcome::Updated));
  assert!(report.restart_required().collector);
  assert!(!report.restart_required().instrumented_apps);

  let values = registry
    .read(COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE)
    .unwrap()
    .unwrap();
  assert!(values.contains(&"UNRELATED=keep".to_string()));
  assert!(values.contains(&"SPLUNK_ACCESS_TOKEN=t".to_string()));
  // Keys match case-insensitively; the existing spelling is replaced.
  assert_eq!(values.iter().filter(|v| v.to_ascii_uppercase().starts_with("SPLUNK_REALM=")).count(), 1);
  assert!(values.iter().any(|v| v.ends_with("=us0")));

  let again = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();
  assert!(!again.has_changes());
}

#[test]
fn registry_merge_carries_blank_and_malformed_strings() {
  let host = Host::new();
  let registry = host.registry();
  let seeded = ["SPLUNK_LISTEN_INTERFACE=", "NO_EQUALS_ENTRY", "KEEP=1"].map(String::from);
  registry.write(COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE, &seeded).unwrap();

  let f = windows_facts(&[("SPLUNK_REALM", "us0")]);
  let report = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();
  assert_eq!(report.outcome(Artifact::CollectorEnv), Some(Outcome::Updated));

  let values = registry
    .read(COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE)
    .unwrap()
    .unwrap();
  assert_eq!(
    values,
    vec!["KEEP=1", "NO_EQUALS_ENTRY", "SPLUNK_LISTEN_INTERFACE=", "SPLUNK_REALM=us0"]
  );

  let again = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();
  assert!(!again.has_changes());
}

#[test]
fn blank_collector_value_unsets_key() {
  let host = Host::new();
  let registry = host.registry();
  registry
    .write(
      COLLECTOR_SERVICE_KEY,
      COLLECTOR_SERVICE_VALUE,
      &["SPLUNK_MEMORY_TOTAL_MIB=512".to_string(), "OTHER=1".to_string()],
    )
    .unwrap();

  let f = windows_facts(&[("SPLUNK_MEMORY_TOTAL_MIB", "")]);
  host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();

  let values = registry
    .read(COLLECTOR_SERVICE_KEY, COLLECTOR_SERVICE_VALUE)
    .unwrap()
    .unwrap();
  assert_eq!(values, vec!["OTHER=1".to_string()]);
}

#[test]
fn windows_plan_leaves_linux_files_alone() {
  let host = Host::new();
  let f = windows_facts(&[("SPLUNK_REALM", "us0")]);
  host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();
  assert!(!host.paths().preload.exists());
  assert!(!host.paths().collector_env.exists());
}

#[test]
fn linux_collector_env_is_replaced_wholesale() {
  let host = Host::new();
  let path = host.paths().collector_env.clone();
  host.write(&path, "STALE=1\n");

  let mut f = facts("0.99.0", DeliveryMode::Zeroconfig);
  f.collector = collector(&[("SPLUNK_REALM", "us0")]);
  let report = host.reconciler.reconcile(&f, ReconcileOptions::default()).unwrap();

  assert_eq!(report.outcome(Artifact::CollectorEnv), Some(Outcome::Updated));
  assert_eq!(host.read(&path), "SPLUNK_REALM=us0\n");
  assert!(report.restart_required().collector);
}
