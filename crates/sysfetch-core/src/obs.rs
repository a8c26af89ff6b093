//! Structured observability hooks for the sysfetch run lifecycle.
//!
//! Every event carries an `event` field so log pipelines can filter on it:
//! - `context.initialized` / `context.finalized`
//! - `resolver.step` / `resolver.short_circuit` / `resolver.resolved`
//! - `probe.launched` / `probe.finished`

use crate::identity::IdentityRecord;
use tracing::{debug, info};

/// Emit event: runtime context initialised.
pub fn emit_context_initialized(multithreading: bool, pipe: bool) {
    debug!(event = "context.initialized", multithreading = multithreading, pipe = pipe);
}

/// Emit event: runtime context torn down, with how many resources were released.
pub fn emit_context_finalized(released: usize) {
    debug!(event = "context.finalized", released = released);
}

/// Emit event: a cascade source was tried.
pub fn emit_resolver_step(source: &str, found: bool) {
    debug!(event = "resolver.step", source = %source, found = found);
}

/// Emit event: the cascade stopped early.
pub fn emit_resolver_short_circuit(step: &str) {
    debug!(event = "resolver.short_circuit", step = %step);
}

/// Emit event: resolution finished.
pub fn emit_identity_resolved(step: &str, record: &IdentityRecord) {
    info!(
        event = "resolver.resolved",
        step = %step,
        id = %record.id,
        usable = record.all_relevant_values_set(),
    );
}

/// Emit event: background probe thread spawned.
pub fn emit_probe_launched(probe: &str) {
    debug!(event = "probe.launched", probe = %probe);
}

/// Emit event: background probe published its result.
pub fn emit_probe_finished(probe: &str, elapsed_ms: u64) {
    debug!(event = "probe.finished", probe = %probe, elapsed_ms = elapsed_ms);
}
