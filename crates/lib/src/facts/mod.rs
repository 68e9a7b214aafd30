//! Desired instrumentation state.

mod file;
mod types;
mod version;

pub use file::{FactsError, FactsFile, HostOverrides, HostProbe, SystemProbe};
pub use types::{DeliveryMode, HostFacts, InstallLayout, InstrumentationFacts, InstrumentationOptions, Sdk};
pub use version::{AgentVersion, VersionError, VersionGates};
