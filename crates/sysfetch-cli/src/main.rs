//! sysfetch - system information fetcher
//!
//! Prints the identity of the running operating system, plus whatever the
//! background desktop probes managed to find within the processing timeout.
//!
//! ## Output
//!
//! - `--format text`: one `Key<separator>value` line per known fact
//! - `--format json`: a JSON array of `{ "type", "result" }` entries

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use sysfetch_core::{
    Configuration, DetectionOrchestrator, DisplayServerInfo, IdentityRecord, OsIdentityResolver,
    ProbeResults, ResolverEnv, ResolverPaths, RuntimeContext, SessionGuard, ToolkitInfo,
};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sysfetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch and display system information", long_about = None)]
struct Cli {
    /// JSON configuration document
    #[arg(short, long, env = "SYSFETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directory release files are resolved against
    #[arg(long, env = "SYSFETCH_ROOT", default_value = "/")]
    root: PathBuf,

    /// Read only this release file instead of the standard locations
    #[arg(long)]
    os_release: Option<PathBuf>,

    /// Run every detection on the main thread
    #[arg(long)]
    no_multithreading: bool,

    /// Report the host distribution instead of Bedrock Linux
    #[arg(long)]
    no_escape_bedrock: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,

    /// Print the features this build supports and exit
    #[arg(long)]
    list_features: bool,
}

/// Probe results collected once for rendering.
#[derive(Debug, Default)]
struct ProbeSnapshot {
    display_server: Option<DisplayServerInfo>,
    toolkits: Vec<(&'static str, ToolkitInfo)>,
}

#[derive(Serialize)]
struct ToolkitEntry<'a> {
    toolkit: &'a str,
    #[serde(flatten)]
    info: &'a ToolkitInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    sysfetch_core::init_tracing(cli.json_logs, level);

    let orchestrator = DetectionOrchestrator::default();
    if cli.list_features {
        for feature in orchestrator.capabilities().features() {
            println!("{}", feature);
        }
        return Ok(());
    }

    let mut ctx = prepare_context(&cli)?;
    let runtime = Handle::current();

    orchestrator.maybe_start_background_probes(&mut ctx);

    let guard = SessionGuard::start(ctx.config(), ctx.result_document().is_some(), &runtime)
        .context("Failed to install terminal session handlers")?;

    let record = resolve_identity(&cli, ctx.config());
    let timeout = Duration::from_millis(ctx.config().general.processing_timeout_ms);
    let snapshot = collect_probes(&ctx.state().probes, timeout).await;

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(ctx.config(), &record, &snapshot)),
        OutputFormat::Json => {
            fill_result_document(&mut ctx, &record, &snapshot)?;
            if let Some(doc) = ctx.result_document() {
                println!("{}", serde_json::to_string_pretty(doc)?);
            }
        }
    }

    guard.finish();
    let released = ctx.finalize();
    debug!(released, "Done");
    Ok(())
}

/// Build the runtime context: defaults, then the config document, then flags.
fn prepare_context(cli: &Cli) -> Result<RuntimeContext> {
    let mut ctx = RuntimeContext::initialize();

    if let Some(path) = &cli.config {
        ctx.load_config_document(path)
            .with_context(|| format!("Failed to load config document {}", path.display()))?;
    }

    apply_overrides(ctx.config_mut()?, cli);

    if cli.format == OutputFormat::Json {
        ctx.enable_result_document();
    }
    Ok(ctx)
}

fn apply_overrides(config: &mut Configuration, cli: &Cli) {
    if cli.no_multithreading {
        config.general.multithreading = false;
    }
    if cli.no_escape_bedrock {
        config.general.escape_bedrock = false;
    }
}

fn resolve_identity(cli: &Cli, config: &Configuration) -> IdentityRecord {
    let mut paths = ResolverPaths::new(&cli.root);
    if let Some(custom) = &cli.os_release {
        paths = paths.with_custom_os_release(custom);
    }
    OsIdentityResolver::from_config(config, paths, ResolverEnv::from_process()).resolve()
}

/// Wait for every probe concurrently; `timeout` bounds the whole collection.
async fn collect_probes(results: &ProbeResults, timeout: Duration) -> ProbeSnapshot {
    let deadline = Instant::now() + timeout;

    let (display_server, qt, gtk2, gtk3, gtk4) = tokio::join!(
        results.display_server.wait_until(deadline),
        results.qt.wait_until(deadline),
        results.gtk2.wait_until(deadline),
        results.gtk3.wait_until(deadline),
        results.gtk4.wait_until(deadline),
    );

    let toolkits = [("Qt", qt), ("GTK2", gtk2), ("GTK3", gtk3), ("GTK4", gtk4)]
        .into_iter()
        .filter_map(|(name, status)| status.ready().map(|info| (name, info)))
        .filter(|(_, info)| !info.is_empty())
        .collect();

    ProbeSnapshot {
        display_server: display_server.ready(),
        toolkits,
    }
}

fn describe_display(info: &DisplayServerInfo) -> Option<String> {
    match (info.desktop.is_empty(), info.protocol.is_empty()) {
        (false, false) => Some(format!("{} ({})", info.desktop, info.protocol)),
        (false, true) => Some(info.desktop.clone()),
        (true, false) => Some(info.protocol.clone()),
        (true, true) => None,
    }
}

fn render_text(config: &Configuration, record: &IdentityRecord, snapshot: &ProbeSnapshot) -> String {
    let mut lines = Vec::new();
    let sep = &config.key_value_separator;

    let os = record.to_string();
    if !os.is_empty() {
        lines.push(format!("OS{}{}", sep, os));
    }

    if let Some(display) = snapshot.display_server.as_ref().and_then(describe_display) {
        lines.push(format!("DE{}{}", sep, display));
    }

    for (name, info) in &snapshot.toolkits {
        if !info.theme.is_empty() {
            lines.push(format!("Theme ({}){}{}", name, sep, info.theme));
        }
        if !info.icons.is_empty() {
            lines.push(format!("Icons ({}){}{}", name, sep, info.icons));
        }
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn fill_result_document(
    ctx: &mut RuntimeContext,
    record: &IdentityRecord,
    snapshot: &ProbeSnapshot,
) -> Result<()> {
    ctx.push_result("OS", record)?;
    if let Some(display) = &snapshot.display_server {
        ctx.push_result("DisplayServer", display)?;
    }
    for (name, info) in &snapshot.toolkits {
        ctx.push_result("Theme", &ToolkitEntry { toolkit: name, info })?;
    }
    Ok(())
}
