//! zcfg-lib: reconciliation of auto-instrumentation configuration
//!
//! This crate turns a desired instrumentation state into on-host artifacts:
//! - `InstrumentationFacts`: the immutable desired state of one run
//! - `Plan`: which artifacts must exist and which must be removed
//! - `Reconciler`: converges targets onto a plan and reports what changed
//! - `EnvSet`: the key/value sets every stage exchanges

pub mod consts;
pub mod env;
pub mod error;
pub mod facts;
pub mod lock;
pub mod plan;
pub mod platform;
pub mod reconcile;
pub mod render;
pub mod store;
pub mod util;

pub use env::EnvSet;
pub use error::ReconcileError;
pub use facts::InstrumentationFacts;
pub use plan::Plan;
pub use reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
