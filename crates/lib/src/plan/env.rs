//! Variables each artifact carries.

use crate::consts::{ZC_METHOD_ATTR, ZC_METHOD_MECHANISM};
use crate::env::{EnvSet, is_blank};
use crate::facts::{DeliveryMode, InstallLayout, InstrumentationFacts, Sdk};

const DOTNET_PROFILER_ID: &str = "{918728DD-259F-4A6A-AC2B-B85E1B658318}";
const DOTNET_PLUGINS: &str = "Splunk.OpenTelemetry.AutoInstrumentation.Plugin,Splunk.OpenTelemetry.AutoInstrumentation";

/// The `OTEL_RESOURCE_ATTRIBUTES` value tagging how instrumentation was set up.
pub fn resource_attributes(facts: &InstrumentationFacts, mode: DeliveryMode) -> String {
  let mut attrs = format!("{}={}-{}", ZC_METHOD_ATTR, ZC_METHOD_MECHANISM, facts.version);
  if mode == DeliveryMode::Systemd {
    attrs.push_str("-systemd");
  }
  let options = &facts.options;
  if !is_blank(&options.deployment_environment) {
    attrs.push_str(",deployment.environment=");
    attrs.push_str(options.deployment_environment.trim());
  }
  if !is_blank(&options.resource_attributes) {
    attrs.push(',');
    attrs.push_str(options.resource_attributes.trim());
  }
  attrs
}

/// Variables that load one SDK's agent.
pub fn sdk_env(sdk: Sdk, layout: &InstallLayout) -> EnvSet {
  let mut env = EnvSet::new();
  match sdk {
    Sdk::Java => {
      env.set("JAVA_TOOL_OPTIONS", format!("-javaagent:{}", layout.java_agent_jar));
    }
    Sdk::Nodejs => {
      env.set(
        "NODE_OPTIONS",
        format!("-r {}/node_modules/@splunk/otel/instrument", layout.node_prefix),
      );
    }
    Sdk::Dotnet => {
      let home = layout.dotnet_home.as_str();
      env.set("CORECLR_ENABLE_PROFILING", "1");
      env.set("CORECLR_PROFILER", DOTNET_PROFILER_ID);
      env.set(
        "CORECLR_PROFILER_PATH",
        format!("{}/linux-x64/OpenTelemetry.AutoInstrumentation.Native.so", home),
      );
      env.set("DOTNET_ADDITIONAL_DEPS", format!("{}/AdditionalDeps", home));
      env.set("DOTNET_SHARED_STORE", format!("{}/store", home));
      env.set(
        "DOTNET_STARTUP_HOOKS",
        format!("{}/net/OpenTelemetry.AutoInstrumentation.StartupHook.dll", home),
      );
      env.set("OTEL_DOTNET_AUTO_HOME", home);
      env.set("OTEL_DOTNET_AUTO_PLUGINS", DOTNET_PLUGINS);
    }
  }
  env
}

/// Variables shared by every SDK, followed by the user overrides.
///
/// Blank options are carried as blank values so they are never rendered.
pub fn common_env(facts: &InstrumentationFacts, mode: DeliveryMode) -> EnvSet {
  let options = &facts.options;
  let mut env = EnvSet::new();
  env.set("OTEL_RESOURCE_ATTRIBUTES", resource_attributes(facts, mode));
  env.set("SPLUNK_PROFILER_ENABLED", options.enable_profiler.to_string());
  env.set("SPLUNK_PROFILER_MEMORY_ENABLED", options.enable_profiler_memory.to_string());
  env.set("SPLUNK_METRICS_ENABLED", options.enable_metrics.to_string());
  env.set("OTEL_SERVICE_NAME", options.service_name.as_str());
  env.set("OTEL_EXPORTER_OTLP_ENDPOINT", options.otlp_endpoint.as_str());
  env.set("OTEL_EXPORTER_OTLP_PROTOCOL", options.otlp_endpoint_protocol.as_str());
  env.set("OTEL_METRICS_EXPORTER", options.metrics_exporter.as_str());
  env.set("OTEL_LOGS_EXPORTER", options.logs_exporter.as_str());
  env.extend(facts.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())));
  env
}

/// Content of one per-SDK zeroconfig file.
pub fn zeroconfig_env(facts: &InstrumentationFacts, sdk: Sdk) -> EnvSet {
  let mut env = sdk_env(sdk, &facts.layout);
  env.extend(common_env(facts, DeliveryMode::Zeroconfig).iter());
  env
}

/// Content of the systemd drop-in: every qualifying SDK, then the common block once.
pub fn systemd_env(facts: &InstrumentationFacts, sdks: &[Sdk]) -> EnvSet {
  let mut env = EnvSet::new();
  for sdk in sdks {
    env.extend(sdk_env(*sdk, &facts.layout).iter());
  }
  if env.is_empty() {
    return env;
  }
  env.extend(common_env(facts, DeliveryMode::Systemd).iter());
  env
}

/// Content of the single-file config read by `libsplunk.so` on old agents.
pub fn legacy_env(facts: &InstrumentationFacts) -> EnvSet {
  let options = &facts.options;
  let mut env = EnvSet::new();
  env.set("java_agent_jar", facts.layout.java_agent_jar.as_str());
  env.set("resource_attributes", resource_attributes(facts, DeliveryMode::Legacy));
  env.set("service_name", options.service_name.as_str());
  env.set("generate_service_name", options.generate_service_name.to_string());
  env.set("disable_telemetry", options.disable_telemetry.to_string());
  env.set("enable_profiler", options.enable_profiler.to_string());
  env.set("enable_profiler_memory", options.enable_profiler_memory.to_string());
  env.set("enable_metrics", options.enable_metrics.to_string());
  env
}
