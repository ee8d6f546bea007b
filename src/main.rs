use anyhow::{bail, Context};
use clap::Parser;
use sentinel_dash::cli::{self, Cli, Commands};
use sentinel_dash::config::AppConfig;
use sentinel_dash::domain::ActionStatus;
use sentinel_dash::logging::{init_logging_file, init_logging_simple};
use sentinel_dash::tui;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command() {
        Commands::Watch => {
            if let Some(dir) = init_logging_file(&config.logging) {
                eprintln!("Logging to: {}", dir.display());
            }
            info!("Loaded config: api={} poll={}ms", config.api.base_url, config.polling.interval_ms);
            tui::run_dashboard(&config).await?;
        }
        Commands::Status { json } => {
            init_logging_simple();
            cli::run_status(&config, json).await?;
        }
        Commands::Kill { yes } => {
            init_logging_simple();
            let outcome = cli::run_kill(&config, yes).await?;
            if outcome.map(|o| o.status) != Some(ActionStatus::Success) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = cli
        .load_config()
        .with_context(|| format!("loading config from {}", cli.config_dir.display()))?;

    if let Err(errors) = config.validate() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(config)
}
