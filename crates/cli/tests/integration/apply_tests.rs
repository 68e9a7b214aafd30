//! Apply command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const JAVA_CONF: &str = "/etc/splunk/zeroconfig/java.conf";
const DOTNET_CONF: &str = "/etc/splunk/zeroconfig/dotnet.conf";
const NODE_CONF: &str = "/etc/splunk/zeroconfig/node.conf";
const SYSTEMD_CONF: &str = "/usr/lib/systemd/system.conf.d/00-splunk-otel-auto-instrumentation.conf";
const PRELOAD: &str = "/etc/ld.so.preload";
const LIBSPLUNK: &str = "/usr/lib/splunk-instrumentation/libsplunk.so";

#[test]
fn apply_zeroconfig_writes_per_sdk_files() {
  let env = TestEnv::from_fixture("zeroconfig.json");

  env
    .run("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("Apply complete"));

  let java = env.read_target(JAVA_CONF);
  assert!(java.contains("JAVA_TOOL_OPTIONS=-javaagent:/usr/lib/splunk-instrumentation/splunk-otel-javaagent.jar\n"));
  assert!(java.contains("OTEL_SERVICE_NAME=checkout\n"));
  assert!(java.contains("deployment.environment=staging"));

  let dotnet = env.read_target(DOTNET_CONF);
  assert!(dotnet.contains("CORECLR_ENABLE_PROFILING=1\n"));
  assert!(!env.target(NODE_CONF).exists());

  assert_eq!(env.read_target(PRELOAD), format!("{}\n", LIBSPLUNK));
  assert!(!env.target(SYSTEMD_CONF).exists());
}

#[test]
fn apply_is_idempotent() {
  let env = TestEnv::from_fixture("zeroconfig.json");

  env.run("apply").assert().success();
  let first = env.read_target(JAVA_CONF);

  env
    .run("apply")
    .assert()
    .success()
    .stdout(predicate::str::contains("0 created, 0 updated, 0 deleted"));
  assert_eq!(env.read_target(JAVA_CONF), first);
}

#[test]
fn apply_switching_to_systemd_cleans_up_preload_mode() {
  let env = TestEnv::from_fixture("zeroconfig.json");
  env.write_target(PRELOAD, "/opt/other/libfoo.so\n");

  env.run("apply").assert().success();
  assert_eq!(
    env.read_target(PRELOAD),
    format!("/opt/other/libfoo.so\n{}\n", LIBSPLUNK)
  );

  env.use_fixture("systemd.json");
  env
    .run("apply")
    .assert()
    .success()
    .stderr(predicate::str::contains("Restart instrumented applications"));

  assert!(!env.target(JAVA_CONF).exists());
  assert!(!env.target(DOTNET_CONF).exists());
  assert_eq!(env.read_target(PRELOAD), "/opt/other/libfoo.so\n");

  let dropin = env.read_target(SYSTEMD_CONF);
  assert!(dropin.starts_with("[Manager]\n"));
  assert!(dropin.contains("DefaultEnvironment=\"OTEL_TRACES_SAMPLER=always_on\""));
  assert!(dropin.contains("-systemd"));
}

#[test]
fn apply_rejects_systemd_on_incapable_host() {
  let env = TestEnv::from_fixture("no_systemd.json");

  env
    .run("apply")
    .assert()
    .failure()
    .stderr(predicate::str::contains("not systemd-capable"));

  assert!(!env.target(PRELOAD).exists());
  assert!(!env.report_path().exists());
}

#[test]
fn apply_invalid_value_touches_nothing() {
  let env = TestEnv::from_fixture("invalid_value.json");

  env
    .run("apply")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value"));

  assert!(!env.target(JAVA_CONF).exists());
  assert!(!env.target(PRELOAD).exists());
  assert!(!env.report_path().exists());
}

#[test]
fn apply_json_outputs_report() {
  let env = TestEnv::from_fixture("zeroconfig.json");

  let output = env.run("apply").arg("--json").output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["mode"], "zeroconfig");
  assert_eq!(report["dry_run"], false);
  let outcomes = report["outcomes"].as_array().unwrap();
  assert!(
    outcomes
      .iter()
      .any(|o| o["artifact"] == "zeroconfig:java" && o["outcome"] == "created")
  );
}

// The emulated registry only stands in for the real one off Windows.
#[cfg(not(windows))]
#[test]
fn apply_merges_collector_environment_value() {
  let env = TestEnv::from_fixture("windows_collector.json");
  let value = env
    .data_path()
    .join("registry/SYSTEM/CurrentControlSet/Services/splunk-otel-collector/Environment");
  std::fs::create_dir_all(value.parent().unwrap()).unwrap();
  std::fs::write(&value, "SPLUNK_REALM=eu0\nUNRELATED=keep\n").unwrap();

  env
    .run("apply")
    .assert()
    .success()
    .stderr(predicate::str::contains("Restart the collector service"));

  let content = std::fs::read_to_string(&value).unwrap();
  assert!(content.contains("SPLUNK_REALM=us0\n"));
  assert!(content.contains("UNRELATED=keep\n"));
  assert!(content.contains("SPLUNK_ACCESS_TOKEN=token\n"));
  assert!(!env.target(PRELOAD).exists());
}
