//! Runtime context for one sysfetch run
//!
//! The context is an explicit object created once at process start and
//! passed to every component that needs it. It owns:
//!
//! - the [`Configuration`], shared read-only with background probes
//! - the [`State`], written by the main flow and holding resources that may
//!   or may not have been created during the run
//!
//! [`RuntimeContext::finalize`] releases everything exactly once. Calling it
//! again releases nothing. Using the context after finalize is a programming
//! error and panics.

use crate::config::Configuration;
use crate::error::{Result, SysfetchError};
use crate::metrics::METRICS;
use crate::obs;
use crate::orchestrator::ProbeResults;
use crate::platform::Platform;
use crate::resource::Resource;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initialized,
    Finalized,
}

/// Mutable per-run state.
#[derive(Debug, Default)]
pub struct State {
    pub logo_width: u32,
    pub logo_height: u32,
    pub keys_height: u32,

    pub platform: Resource<Platform>,
    /// Parsed input configuration document, if one was supplied
    pub config_doc: Resource<Value>,
    /// Output result document, if JSON output was requested
    pub result_doc: Resource<Value>,

    pub probes: ProbeResults,
}

impl State {
    fn new() -> Self {
        let mut state = State::default();
        state.platform.create(Platform::collect());
        state
    }

    /// Release every created resource. Returns how many were released.
    fn destroy(&mut self) -> usize {
        let released = [
            self.platform.destroy(),
            self.config_doc.destroy(),
            self.result_doc.destroy(),
        ]
        .into_iter()
        .filter(|released| *released)
        .count();

        // Dropping the receivers is enough; probes own their senders
        self.probes = ProbeResults::skipped();
        released
    }
}

/// Configuration and state for one run.
#[derive(Debug)]
pub struct RuntimeContext {
    config: Option<Arc<Configuration>>,
    state: State,
    phase: Phase,
}

impl RuntimeContext {
    /// Create a context with default configuration and empty state.
    pub fn initialize() -> Self {
        Self::with_config(Configuration::default())
    }

    /// Create a context around an already-built configuration.
    pub fn with_config(config: Configuration) -> Self {
        obs::emit_context_initialized(config.general.multithreading, config.pipe);
        RuntimeContext {
            config: Some(Arc::new(config)),
            state: State::new(),
            phase: Phase::Initialized,
        }
    }

    fn live_config(&self) -> &Arc<Configuration> {
        debug_assert!(self.phase == Phase::Initialized, "runtime context used after finalize");
        match &self.config {
            Some(config) => config,
            None => panic!("runtime context used after finalize"),
        }
    }

    pub fn config(&self) -> &Configuration {
        self.live_config()
    }

    /// Shared handle to the configuration, for background probes.
    pub fn shared_config(&self) -> Arc<Configuration> {
        Arc::clone(self.live_config())
    }

    /// Mutable configuration, available only until the configuration has
    /// been shared.
    pub fn config_mut(&mut self) -> Result<&mut Configuration> {
        debug_assert!(self.phase == Phase::Initialized, "runtime context used after finalize");
        self.config
            .as_mut()
            .and_then(Arc::get_mut)
            .ok_or_else(|| {
                SysfetchError::InvalidConfig("configuration is already shared".to_string())
            })
    }

    pub fn state(&self) -> &State {
        debug_assert!(self.phase == Phase::Initialized, "runtime context used after finalize");
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        debug_assert!(self.phase == Phase::Initialized, "runtime context used after finalize");
        &mut self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// Load a JSON configuration document and overlay it onto the
    /// configuration. The document is kept in the state.
    pub fn load_config_document(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let doc: Value = serde_json::from_str(&content)?;

        self.config_mut()?.apply_document(&doc)?;
        self.state.config_doc.create(doc);

        info!("Loaded config document {}", path.display());
        Ok(())
    }

    /// Start collecting results into a JSON document.
    pub fn enable_result_document(&mut self) {
        self.state_mut().result_doc.create(Value::Array(Vec::new()));
    }

    pub fn result_document(&self) -> Option<&Value> {
        self.state().result_doc.get()
    }

    /// Append a module result to the result document.
    ///
    /// Returns `false` when no result document was requested.
    pub fn push_result<T: Serialize>(&mut self, module: &str, result: &T) -> Result<bool> {
        let entry = json!({ "type": module, "result": serde_json::to_value(result)? });
        match self.state_mut().result_doc.get_mut() {
            Some(Value::Array(entries)) => {
                entries.push(entry);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Release all owned configuration and state resources.
    ///
    /// Returns the number of resources released by this call; a second call
    /// returns 0.
    pub fn finalize(&mut self) -> usize {
        if self.phase == Phase::Finalized {
            debug!("Runtime context already finalized");
            return 0;
        }

        let mut released = 0;
        if self.config.take().is_some() {
            released += 1;
        }
        released += self.state.destroy();
        self.phase = Phase::Finalized;

        METRICS.flush();
        obs::emit_context_finalized(released);
        released
    }
}

impl Drop for RuntimeContext {
    fn drop(&mut self) {
        if self.phase == Phase::Initialized {
            self.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_creates_platform_only() {
        let ctx = RuntimeContext::initialize();
        assert!(ctx.state().platform.is_created());
        assert!(!ctx.state().config_doc.is_created());
        assert!(!ctx.state().result_doc.is_created());
        assert_eq!(ctx.state().logo_width, 0);
    }

    #[test]
    fn config_mut_refused_once_shared() {
        let mut ctx = RuntimeContext::initialize();
        assert!(ctx.config_mut().is_ok());

        let shared = ctx.shared_config();
        assert!(ctx.config_mut().is_err());

        drop(shared);
        assert!(ctx.config_mut().is_ok());
    }

    #[test]
    fn push_result_without_document_is_noop() {
        let mut ctx = RuntimeContext::initialize();
        assert!(!ctx.push_result("OS", &"Arch").unwrap());
        assert!(ctx.result_document().is_none());
    }

    #[test]
    fn push_result_appends_entries() {
        let mut ctx = RuntimeContext::initialize();
        ctx.enable_result_document();
        assert!(ctx.push_result("OS", &json!({"id": "arch"})).unwrap());

        let doc = ctx.result_document().unwrap();
        assert_eq!(doc[0]["type"], "OS");
        assert_eq!(doc[0]["result"]["id"], "arch");
    }

    #[test]
    #[should_panic(expected = "after finalize")]
    fn config_after_finalize_panics() {
        let mut ctx = RuntimeContext::initialize();
        ctx.finalize();
        let _ = ctx.config();
    }
}
