//! Background detection orchestration
//!
//! A fixed set of probes is started once, right after configuration is
//! ready, each on its own detached OS thread. Nothing ever joins them, so a
//! probe stuck on a hung read cannot hold up process exit. Each probe owns
//! the sending half of its own [`ProbeSlot`], so no two probes can write the
//! same result. Readers join lazily: [`ProbeSlot::peek`] never blocks,
//! [`ProbeSlot::wait`] and [`ProbeSlot::wait_until`] block only up to a
//! deadline.
//!
//! On platforms without background probe support, and when multithreading
//! is disabled, every slot reports [`ProbeStatus::Skipped`].

use crate::context::RuntimeContext;
use crate::metrics::METRICS;
use crate::obs;
use crate::probes::{self, DisplayServerInfo, ProbeContext, ToolkitInfo};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, warn};

/// What a reader currently knows about a probe's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus<T> {
    /// Launched but not finished yet
    Pending,
    Ready(T),
    /// Never launched, or the probe died before publishing
    Skipped,
}

impl<T> ProbeStatus<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ProbeStatus::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Writing half of a probe slot. Consumed by publishing.
#[derive(Debug)]
pub struct ProbeSender<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> ProbeSender<T> {
    pub fn publish(self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

/// Reading half of a probe slot.
#[derive(Debug, Clone)]
pub struct ProbeSlot<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> ProbeSlot<T> {
    pub fn channel() -> (ProbeSender<T>, ProbeSlot<T>) {
        let (tx, rx) = watch::channel(None);
        (ProbeSender { tx }, ProbeSlot { rx })
    }

    /// A slot whose probe will never run.
    pub fn skipped() -> Self {
        let (tx, slot) = Self::channel();
        drop(tx);
        slot
    }

    /// Current status without blocking.
    pub fn peek(&self) -> ProbeStatus<T> {
        // Check closure first: a probe publishes before dropping its sender
        let closed = self.rx.has_changed().is_err();
        match self.rx.borrow().as_ref() {
            Some(value) => ProbeStatus::Ready(value.clone()),
            None if closed => ProbeStatus::Skipped,
            None => ProbeStatus::Pending,
        }
    }

    /// Wait up to `timeout` for the probe to publish.
    ///
    /// Returns `Pending` if the timeout expires first.
    pub async fn wait(&self, timeout: Duration) -> ProbeStatus<T> {
        self.wait_until(tokio::time::Instant::now() + timeout).await
    }

    /// Wait until `deadline` for the probe to publish.
    ///
    /// Several slots waited on concurrently with one shared deadline block
    /// the caller for at most that deadline in total.
    pub async fn wait_until(&self, deadline: tokio::time::Instant) -> ProbeStatus<T> {
        let mut rx = self.rx.clone();
        let outcome = tokio::time::timeout_at(deadline, rx.wait_for(Option::is_some)).await;
        match outcome {
            Ok(Ok(value)) => match value.as_ref() {
                Some(v) => ProbeStatus::Ready(v.clone()),
                None => ProbeStatus::Pending,
            },
            Ok(Err(_)) => ProbeStatus::Skipped,
            Err(_) => ProbeStatus::Pending,
        }
    }
}

/// Result slots of the fixed probe set. Each probe owns exactly one slot.
#[derive(Debug, Clone)]
pub struct ProbeResults {
    pub display_server: ProbeSlot<DisplayServerInfo>,
    pub qt: ProbeSlot<ToolkitInfo>,
    pub gtk2: ProbeSlot<ToolkitInfo>,
    pub gtk3: ProbeSlot<ToolkitInfo>,
    pub gtk4: ProbeSlot<ToolkitInfo>,
}

impl Default for ProbeResults {
    fn default() -> Self {
        Self::skipped()
    }
}

impl ProbeResults {
    pub fn skipped() -> Self {
        ProbeResults {
            display_server: ProbeSlot::skipped(),
            qt: ProbeSlot::skipped(),
            gtk2: ProbeSlot::skipped(),
            gtk3: ProbeSlot::skipped(),
            gtk4: ProbeSlot::skipped(),
        }
    }
}

/// Whether this build/platform can run probes in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub background_probes: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Capabilities {
            background_probes: !cfg!(any(
                target_os = "macos",
                target_os = "ios",
                target_os = "windows",
                target_os = "android"
            )),
        }
    }

    /// Feature names for `--list-features`.
    pub fn features(&self) -> Vec<&'static str> {
        let mut features = Vec::new();
        if self.background_probes {
            features.push("threads");
        }
        if cfg!(unix) {
            features.push("signals");
        }
        features
    }
}

/// Starts the fixed set of background probes.
#[derive(Debug, Clone, Copy)]
pub struct DetectionOrchestrator {
    capabilities: Capabilities,
}

impl Default for DetectionOrchestrator {
    fn default() -> Self {
        Self::new(Capabilities::detect())
    }
}

impl DetectionOrchestrator {
    pub fn new(capabilities: Capabilities) -> Self {
        DetectionOrchestrator { capabilities }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Launch the background probes if configuration and platform allow it,
    /// storing their slots in the context state.
    ///
    /// Returns whether probes were launched. Must be called once, after the
    /// configuration is final.
    pub fn maybe_start_background_probes(&self, ctx: &mut RuntimeContext) -> bool {
        let config = ctx.shared_config();

        if !config.general.multithreading || !self.capabilities.background_probes {
            debug!(
                multithreading = config.general.multithreading,
                supported = self.capabilities.background_probes,
                "Background probes not started"
            );
            ctx.state_mut().probes = ProbeResults::skipped();
            return false;
        }

        let probe_ctx = ProbeContext::capture(config, ctx.state().platform.get());

        let results = ProbeResults {
            display_server: launch("display_server", probe_ctx.clone(), |c| {
                probes::detect_display_server(&c)
            }),
            qt: launch("qt", probe_ctx.clone(), |c| probes::detect_qt(&c)),
            gtk2: launch("gtk2", probe_ctx.clone(), |c| probes::detect_gtk(&c, 2)),
            gtk3: launch("gtk3", probe_ctx.clone(), |c| probes::detect_gtk(&c, 3)),
            gtk4: launch("gtk4", probe_ctx, |c| probes::detect_gtk(&c, 4)),
        };

        ctx.state_mut().probes = results;
        true
    }
}

fn launch<T, F>(name: &'static str, probe_ctx: ProbeContext, probe: F) -> ProbeSlot<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(ProbeContext) -> T + Send + 'static,
{
    let (tx, slot) = ProbeSlot::channel();

    // JoinHandle dropped: readers join through the slot, and process exit
    // never waits on a blocked probe
    let spawned = thread::Builder::new()
        .name(format!("probe-{name}"))
        .spawn(move || {
            let started = Instant::now();
            let value = probe(probe_ctx);
            tx.publish(value);
            METRICS.inc_probes_finished();
            obs::emit_probe_finished(name, started.elapsed().as_millis() as u64);
        });

    match spawned {
        Ok(_) => {
            METRICS.inc_probes_launched();
            obs::emit_probe_launched(name);
        }
        // The closure, and with it the sender, is dropped: the slot reads Skipped
        Err(e) => warn!("Failed to spawn probe thread {}: {}", name, e),
    }

    slot
}
