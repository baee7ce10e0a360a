use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use aura_mediator::bridge::{AuraBridge, HeadlessSurface, StaticKernel};
use aura_mediator::config::Config;
use aura_mediator::mediation::MediationEngine;
use aura_mediator::platform::ReplaySource;
use aura_mediator::service::{shutdown_on, MediatorService};
use aura_mediator::telemetry::journal::default_journal_path;
use aura_mediator::telemetry::{OutcomeJournal, Telemetry, TracingSink};

#[derive(Parser)]
#[command(name = "aura-mediator")]
#[command(about = "Aura UI mediation service", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file (defaults to AURA_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded event script through the mediation service
    Run {
        /// JSON array of replay steps
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run { scenario } => {
            let bridge = AuraBridge::new(StaticKernel::default(), HeadlessSurface);
            bridge.boot()?;

            let telemetry = build_telemetry(&config)?;
            let engine = Arc::new(MediationEngine::with_telemetry(
                config.mediation.clone(),
                telemetry,
            ));
            let source = ReplaySource::from_file(&scenario)?;

            let service = MediatorService::new(engine, source);
            let summary = service
                .run_until(shutdown_on(tokio::signal::ctrl_c()))
                .await;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn build_telemetry(config: &Config) -> Result<Telemetry> {
    let mut telemetry = Telemetry::new()
        .with_privacy(config.privacy_level)
        .with_sink(Arc::new(TracingSink));

    if config.journal_enabled {
        let path = match &config.journal_path {
            Some(path) => path.clone(),
            None => default_journal_path()?,
        };
        tracing::info!("Persisting outcomes to {}", path.display());
        telemetry = telemetry.with_sink(Arc::new(OutcomeJournal::open(&path)?));
    }

    Ok(telemetry)
}
