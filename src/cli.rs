use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{Endpoints, HttpStatusClient, StatusTransport};
use crate::config::AppConfig;
use crate::domain::{ActionOutcome, DashboardSnapshot, SourceKind};
use crate::error::Result;
use crate::safety::{KillDialog, KillSwitchDispatcher, SafetyVerdict};
use crate::services::Aggregator;
use crate::tui::widgets::cards::card_lines;

#[derive(Parser)]
#[command(name = "sentinel-dash")]
#[command(version)]
#[command(about = "Read-only operational dashboard for the trading control plane", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Control-plane API base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, global = true, env = "SENTINEL_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive terminal dashboard (default)
    Watch,
    /// Poll every source once and print state plus verdict
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Engage the executor kill switch through the safety gate
    Kill {
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Watch)
    }

    /// Load config from `--config-dir`, then apply `--base-url`
    pub fn load_config(&self) -> Result<AppConfig> {
        let config = AppConfig::load_from(&self.config_dir)?;
        Ok(match &self.base_url {
            Some(base) => config.with_base_url(base.trim()),
            None => config,
        })
    }
}

fn build(config: &AppConfig) -> Result<(Arc<dyn StatusTransport>, Endpoints)> {
    let endpoints = Endpoints::new(&config.api.base_url)?;
    let client: Arc<dyn StatusTransport> = Arc::new(HttpStatusClient::new(config.request_timeout())?);
    Ok((client, endpoints))
}

/// One poll cycle, printed
pub async fn run_status(config: &AppConfig, json: bool) -> Result<()> {
    let (transport, endpoints) = build(config)?;
    let aggregator = Aggregator::new(transport, endpoints);
    aggregator.refresh_all().await;

    let snapshot = aggregator.snapshot();
    let verdict = SafetyVerdict::evaluate(&snapshot);

    if json {
        let report = serde_json::json!({
            "base_url": aggregator.endpoints().base(),
            "verdict": verdict,
            "snapshot": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_status(&snapshot, &verdict));
    }
    Ok(())
}

/// Plain-text status report
pub fn render_status(snapshot: &DashboardSnapshot, verdict: &SafetyVerdict) -> String {
    let mut out = String::new();
    out.push_str(&format!("Banner: {}", verdict.banner.level));
    if !verdict.banner.message.is_empty() {
        out.push_str(&format!(" - {}", verdict.banner.message));
    }
    out.push('\n');
    out.push_str(&format!(
        "Automation locked: {}   Lock recommended: {} (deny={}, evidence_bad={})\n",
        verdict.automation_locked,
        verdict.lock_recommended,
        verdict.deny_count,
        verdict.evidence_bad_count
    ));

    for kind in SourceKind::ALL {
        let link = match (snapshot.result(kind).error.as_deref(), snapshot.last_http_code(kind)) {
            (Some(err), _) => format!("error: {err}"),
            (None, Some(code)) => format!("HTTP {code}"),
            (None, None) => "not polled".to_string(),
        };
        out.push_str(&format!("\n[{}] {}\n", kind.title(), link));
        for (label, value) in card_lines(snapshot, kind) {
            out.push_str(&format!("  {label:<18}{value}\n"));
        }
    }
    out
}

/// Ask on the terminal. Anything but y/yes declines.
pub fn confirm_prompt<R: BufRead, W: Write>(mut input: R, mut output: W, target: &str) -> bool {
    let _ = write!(output, "Engage kill switch at {target}? [y/N] ");
    let _ = output.flush();
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Refresh the executor, evaluate the gate and dispatch. `None` when the
/// operator declined.
pub async fn run_kill(config: &AppConfig, yes: bool) -> Result<Option<ActionOutcome>> {
    let (transport, endpoints) = build(config)?;
    let dispatcher = KillSwitchDispatcher::new(Arc::clone(&transport), endpoints.clone());
    let aggregator = Aggregator::new(transport, endpoints);

    aggregator.refresh_source(SourceKind::Executor).await;
    let snapshot = aggregator.snapshot();
    let verdict = SafetyVerdict::evaluate(&snapshot);
    println!("Banner: {} {}", verdict.banner.level, verdict.banner.message);

    if !yes {
        let stdin = std::io::stdin();
        if !confirm_prompt(stdin.lock(), std::io::stdout(), aggregator.endpoints().base()) {
            println!("Cancelled");
            return Ok(None);
        }
        // The answer may come much later; gate on fresh state.
        aggregator.refresh_source(SourceKind::Executor).await;
    }

    let mut dialog = KillDialog::new();
    dialog.open();
    let outcome = dispatcher.confirm(&mut dialog, &aggregator.snapshot()).await;
    if let Some(outcome) = &outcome {
        println!("{}", outcome.detail);
    }
    Ok(outcome)
}
