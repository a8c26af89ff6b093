//! Terminal session guard.
//!
//! While a report is printed the cursor is hidden and line wrapping is
//! disabled. [`SessionGuard`] undoes both when it is finished or dropped,
//! and when the process receives SIGINT, SIGTERM or SIGQUIT.

use crate::config::Configuration;
use crate::error::{Result, SysfetchError};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

const RESET_ATTRIBUTES: &str = "\x1b[0m";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const DISABLE_LINEWRAP: &str = "\x1b[?7l";
const ENABLE_LINEWRAP: &str = "\x1b[?7h";

/// Terminal adjustments for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalModes {
    pub reset_attributes: bool,
    pub disable_linewrap: bool,
    pub hide_cursor: bool,
}

impl TerminalModes {
    /// Nothing is touched when output is piped or collected as JSON.
    pub fn from_config(config: &Configuration, has_result_doc: bool) -> Self {
        let interactive = !config.pipe && !has_result_doc;
        TerminalModes {
            reset_attributes: interactive,
            disable_linewrap: config.disable_linewrap && interactive,
            hide_cursor: config.hide_cursor && interactive,
        }
    }

    pub fn start_sequence(&self) -> String {
        let mut seq = String::new();
        if self.reset_attributes {
            seq.push_str(RESET_ATTRIBUTES);
        }
        if self.hide_cursor {
            seq.push_str(HIDE_CURSOR);
        }
        if self.disable_linewrap {
            seq.push_str(DISABLE_LINEWRAP);
        }
        seq
    }

    pub fn restore_sequence(&self) -> String {
        let mut seq = String::new();
        if self.disable_linewrap {
            seq.push_str(ENABLE_LINEWRAP);
        }
        if self.hide_cursor {
            seq.push_str(SHOW_CURSOR);
        }
        seq
    }
}

#[derive(Debug)]
struct Console {
    modes: TerminalModes,
    restored: AtomicBool,
}

impl Console {
    fn restore(&self) {
        if self.restored.swap(true, Ordering::SeqCst) {
            return;
        }
        write_stdout(&self.modes.restore_sequence());
    }
}

fn write_stdout(seq: &str) {
    if seq.is_empty() {
        return;
    }
    let mut out = std::io::stdout().lock();
    // Best effort: a closed stdout leaves nothing to restore
    let _ = out.write_all(seq.as_bytes());
    let _ = out.flush();
}

/// Restores the terminal on finish, drop, or an exit signal.
#[derive(Debug)]
pub struct SessionGuard {
    console: Arc<Console>,
    listener: Option<JoinHandle<()>>,
}

impl SessionGuard {
    /// Apply the terminal modes and install exit-signal handlers.
    pub fn start(config: &Configuration, has_result_doc: bool, runtime: &Handle) -> Result<Self> {
        let modes = TerminalModes::from_config(config, has_result_doc);

        let signals = {
            let _enter = runtime.enter();
            ExitSignals::register()?
        };

        let console = Arc::new(Console {
            modes,
            restored: AtomicBool::new(false),
        });

        let signal_console = Arc::clone(&console);
        let listener = runtime.spawn(async move {
            signals.recv().await;
            debug!("Exit signal received, restoring terminal");
            signal_console.restore();
            std::process::exit(0);
        });

        write_stdout(&modes.start_sequence());

        Ok(SessionGuard {
            console,
            listener: Some(listener),
        })
    }

    /// Restore the terminal now. Equivalent to dropping the guard.
    pub fn finish(self) {}
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.console.restore();
    }
}

#[cfg(unix)]
struct ExitSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ExitSignals {
    fn register() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind| {
            signal(kind).map_err(|e| SysfetchError::Signal(format!("{kind:?}: {e}")))
        };
        Ok(ExitSignals {
            interrupt: install(SignalKind::interrupt())?,
            terminate: install(SignalKind::terminate())?,
            quit: install(SignalKind::quit())?,
        })
    }

    async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
            _ = self.quit.recv() => {}
        }
    }
}

#[cfg(not(unix))]
struct ExitSignals;

#[cfg(not(unix))]
impl ExitSignals {
    fn register() -> Result<Self> {
        Ok(ExitSignals)
    }

    async fn recv(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("ctrl-c handler failed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
