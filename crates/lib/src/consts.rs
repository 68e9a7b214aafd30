pub const APP_NAME: &str = "zcfg";

/// Prefix applied to every file target. Used for staging trees and tests.
pub const ROOT_ENV: &str = "ZCFG_ROOT";

/// Overrides the directory holding the run lock and the last report.
pub const DATA_DIR_ENV: &str = "ZCFG_DATA_DIR";

/// Prefix of the `splunk.zc.method` resource attribute.
pub const ZC_METHOD_ATTR: &str = "splunk.zc.method";
pub const ZC_METHOD_MECHANISM: &str = "splunk-otel-auto-instrumentation";

pub const INSTRUMENTATION_CONFIG_PATH: &str = "/usr/lib/splunk-instrumentation/instrumentation.conf";
pub const ZEROCONFIG_DIR: &str = "/etc/splunk/zeroconfig";
pub const SYSTEMD_CONF_DIR: &str = "/usr/lib/systemd/system.conf.d";
pub const SYSTEMD_CONF_FILENAME: &str = "00-splunk-otel-auto-instrumentation.conf";
pub const PRELOAD_PATH: &str = "/etc/ld.so.preload";
pub const COLLECTOR_ENV_PATH: &str = "/etc/otel/collector/splunk-otel-collector.conf";

pub const COLLECTOR_SERVICE_KEY: &str = r"SYSTEM\CurrentControlSet\Services\splunk-otel-collector";
pub const COLLECTOR_SERVICE_VALUE: &str = "Environment";

pub const INSTRUMENTATION_HOME: &str = "/usr/lib/splunk-instrumentation";
pub const JAVA_AGENT_JAR: &str = "splunk-otel-javaagent.jar";
pub const LIBSPLUNK: &str = "libsplunk.so";
pub const NODE_PREFIX_DIR: &str = "splunk-otel-js";
pub const DOTNET_HOME_DIR: &str = "splunk-otel-dotnet";

pub const REPORT_FILENAME: &str = "last-report.json";
pub const LOCK_FILENAME: &str = ".lock";
