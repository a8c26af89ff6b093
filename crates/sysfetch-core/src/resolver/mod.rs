//! OS identity resolution
//!
//! Resolution is a cascade over candidate release files, tried in a fixed
//! order. Each step may stop the cascade once it has produced a usable
//! record:
//!
//! 0. A custom release path, when one is configured
//! 1. The Bedrock Linux escape hatch (`/bedrock/etc/bedrock-release`)
//! 2. `/etc/lsb-release`
//! 3. `/etc/os-release`
//! 4. `/usr/lib/os-release`
//!
//! After the cascade, vendor rules keyed on the resolved `id` refine the
//! record (Ubuntu flavours, Debian derivatives).
//!
//! The resolver never fails. Missing files fill nothing and the caller gets
//! whatever was found, possibly an empty record.

pub mod debian;
pub mod sources;
pub mod ubuntu;

use crate::config::Configuration;
use crate::identity::IdentityRecord;
use crate::obs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use sources::{parse_lsb_release, parse_os_release};

/// Filesystem locations consulted by the resolver.
///
/// Every well-known path is resolved relative to `root`, so a resolver can be
/// pointed at a mounted image or a test fixture tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPaths {
    /// Root of the filesystem to inspect
    pub root: PathBuf,
    /// Single file to read instead of the whole cascade
    pub custom_os_release: Option<PathBuf>,
}

impl Default for ResolverPaths {
    fn default() -> Self {
        Self::new("/")
    }
}

impl ResolverPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ResolverPaths {
            root: root.into(),
            custom_os_release: None,
        }
    }

    /// Read `path` (as os-release, then lsb-release) instead of the cascade.
    pub fn with_custom_os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_os_release = Some(path.into());
        self
    }

    fn at(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn bedrock_release(&self) -> PathBuf {
        self.at("bedrock/etc/bedrock-release")
    }

    pub fn bedrock_os_release(&self) -> PathBuf {
        self.at("bedrock/etc/os-release")
    }

    pub fn lsb_release(&self) -> PathBuf {
        self.at("etc/lsb-release")
    }

    pub fn os_release(&self) -> PathBuf {
        self.at("etc/os-release")
    }

    pub fn usr_os_release(&self) -> PathBuf {
        self.at("usr/lib/os-release")
    }

    pub fn debian_version(&self) -> PathBuf {
        self.at("etc/debian_version")
    }

    pub fn pveversion(&self) -> PathBuf {
        self.at("usr/bin/pveversion")
    }
}

/// Environment hints consulted during post-processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverEnv {
    /// Colon-separated `XDG_CONFIG_DIRS` value
    pub xdg_config_dirs: Option<String>,
}

impl ResolverEnv {
    /// Capture hints from the current process environment
    pub fn from_process() -> Self {
        ResolverEnv {
            xdg_config_dirs: std::env::var("XDG_CONFIG_DIRS").ok(),
        }
    }
}

/// Which step of the cascade produced the final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    CustomPath,
    EscapeHatch,
    LegacyVendor,
    PrimaryOsRelease,
    FallbackOsRelease,
}

impl CascadeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeStep::CustomPath => "custom_path",
            CascadeStep::EscapeHatch => "escape_hatch",
            CascadeStep::LegacyVendor => "legacy_vendor",
            CascadeStep::PrimaryOsRelease => "primary_os_release",
            CascadeStep::FallbackOsRelease => "fallback_os_release",
        }
    }
}

/// Resolved identity together with the step that ended the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub record: IdentityRecord,
    pub step: CascadeStep,
}

/// Synchronous OS identity resolver.
#[derive(Debug, Clone)]
pub struct OsIdentityResolver {
    paths: ResolverPaths,
    env: ResolverEnv,
    escape_bedrock: bool,
}

impl OsIdentityResolver {
    pub fn new(paths: ResolverPaths, env: ResolverEnv) -> Self {
        OsIdentityResolver {
            paths,
            env,
            escape_bedrock: true,
        }
    }

    /// Build a resolver honouring the `general` settings of `config`.
    pub fn from_config(config: &Configuration, paths: ResolverPaths, env: ResolverEnv) -> Self {
        Self::new(paths, env).with_escape_bedrock(config.general.escape_bedrock)
    }

    pub fn with_escape_bedrock(mut self, enabled: bool) -> Self {
        self.escape_bedrock = enabled;
        self
    }

    /// Resolve the OS identity.
    pub fn resolve(&self) -> IdentityRecord {
        self.resolve_detailed().record
    }

    /// Resolve the OS identity and report which cascade step finished it.
    pub fn resolve_detailed(&self) -> Resolution {
        let _span = tracing::debug_span!("resolver.resolve", root = %self.paths.root.display())
            .entered();

        let mut record = IdentityRecord::new();
        let step = self.run_cascade(&mut record);
        self.post_process(&mut record);

        obs::emit_identity_resolved(step.as_str(), &record);
        Resolution { record, step }
    }

    fn run_cascade(&self, os: &mut IdentityRecord) -> CascadeStep {
        if let Some(custom) = &self.paths.custom_os_release {
            parse_os_release(custom, os);
            parse_lsb_release(custom, os);
            obs::emit_resolver_short_circuit(CascadeStep::CustomPath.as_str());
            return CascadeStep::CustomPath;
        }

        if self.escape_bedrock && self.try_bedrock(os) {
            obs::emit_resolver_short_circuit(CascadeStep::EscapeHatch.as_str());
            return CascadeStep::EscapeHatch;
        }

        if parse_lsb_release(&self.paths.lsb_release(), os) {
            obs::emit_resolver_step("lsb_release", true);

            // MX Linux ships an os-release that claims to be Debian
            if os.id_is("MX") {
                os.name = "MX".to_string();
                os.id_like = "debian".to_string();
                obs::emit_resolver_short_circuit(CascadeStep::LegacyVendor.as_str());
                return CascadeStep::LegacyVendor;
            }

            // Arch and friends advertise DISTRIB_RELEASE=rolling
            if os.version == "rolling" {
                os.version.clear();
            }
        }

        let found = parse_os_release(&self.paths.os_release(), os);
        obs::emit_resolver_step("os_release", found);
        if found && os.all_relevant_values_set() {
            obs::emit_resolver_short_circuit(CascadeStep::PrimaryOsRelease.as_str());
            return CascadeStep::PrimaryOsRelease;
        }

        let found = parse_os_release(&self.paths.usr_os_release(), os);
        obs::emit_resolver_step("usr_os_release", found);
        CascadeStep::FallbackOsRelease
    }

    fn try_bedrock(&self, os: &mut IdentityRecord) -> bool {
        if !parse_os_release(&self.paths.bedrock_release(), os) {
            return false;
        }
        debug!("Bedrock Linux release file found");

        fill_if_empty(&mut os.id, "bedrock");
        fill_if_empty(&mut os.name, "Bedrock");
        fill_if_empty(&mut os.pretty_name, "Bedrock Linux");

        parse_os_release(&self.paths.bedrock_os_release(), os) && os.all_relevant_values_set()
    }

    fn post_process(&self, os: &mut IdentityRecord) {
        if os.id_is("ubuntu") {
            ubuntu::apply_flavour(os, self.env.xdg_config_dirs.as_deref());
        } else if os.id_is("debian") && !debian::detect_derivative(os, &self.paths) {
            debian::apply_debian_version(os, &self.paths.debian_version());
        }
    }
}

fn fill_if_empty(field: &mut String, value: &str) {
    if field.is_empty() {
        field.push_str(value);
    }
}

/// Resolve the identity of the running system with process defaults.
pub fn detect_os(config: &Configuration) -> IdentityRecord {
    OsIdentityResolver::from_config(config, ResolverPaths::default(), ResolverEnv::from_process())
        .resolve()
}

/// Whether `path` refers to an existing regular file.
pub(crate) fn is_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}
