//! sysfetch Core Library
//!
//! Resolves the identity of the running operating system from its release
//! files and bootstraps the runtime context that every other detector uses.
//!
//! ## Layers
//!
//! - [`resolver`]: cascade over release files plus vendor post-processing
//! - [`context`]: configuration + state for one run, with explicit teardown
//! - [`orchestrator`]: fire-and-forget background probes with lazily joined results
//! - [`session`]: terminal restoration on exit

pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod platform;
pub mod probes;
pub mod process;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod telemetry;

pub use config::{BinaryPrefixType, Configuration, GeneralOptions, LibraryPaths, TemperatureUnit};
pub use context::{RuntimeContext, State};
pub use error::{Result, SysfetchError};
pub use identity::IdentityRecord;
pub use metrics::METRICS;
pub use orchestrator::{
    Capabilities, DetectionOrchestrator, ProbeResults, ProbeSender, ProbeSlot, ProbeStatus,
};
pub use platform::Platform;
pub use probes::{DisplayServerInfo, ProbeContext, ToolkitInfo};
pub use resolver::{
    detect_os, CascadeStep, OsIdentityResolver, Resolution, ResolverEnv, ResolverPaths,
};
pub use resource::Resource;
pub use session::{SessionGuard, TerminalModes};
pub use telemetry::init_tracing;

/// sysfetch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
