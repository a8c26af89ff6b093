//! Run counters: release files read, probes started, probes done.
//!
//! The counters are only reported once, at debug level, when
//! [`RuntimeContext::finalize`](crate::RuntimeContext::finalize) flushes them.
//! A launched/finished gap in that line points at a probe still blocked.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the current process.
pub static METRICS: Metrics = Metrics::new();

/// Bumped from the main flow and from probe threads alike.
pub struct Metrics {
    sources_read: AtomicU64,
    probes_launched: AtomicU64,
    probes_finished: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            sources_read: AtomicU64::new(0),
            probes_launched: AtomicU64::new(0),
            probes_finished: AtomicU64::new(0),
        }
    }

    /// A release file was read successfully.
    pub fn inc_sources_read(&self) {
        self.sources_read.fetch_add(1, Ordering::Relaxed);
    }

    /// A probe thread was spawned.
    pub fn inc_probes_launched(&self) {
        self.probes_launched.fetch_add(1, Ordering::Relaxed);
    }

    /// A background probe published its result.
    pub fn inc_probes_finished(&self) {
        self.probes_finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Log every counter in one debug line.
    pub fn flush(&self) {
        tracing::debug!(
            metric = "flush",
            sources_read = self.sources_read(),
            probes_launched = self.probes_launched(),
            probes_finished = self.probes_finished(),
        );
    }

    pub fn sources_read(&self) -> u64 {
        self.sources_read.load(Ordering::Relaxed)
    }

    pub fn probes_launched(&self) -> u64 {
        self.probes_launched.load(Ordering::Relaxed)
    }

    pub fn probes_finished(&self) -> u64 {
        self.probes_finished.load(Ordering::Relaxed)
    }
}
