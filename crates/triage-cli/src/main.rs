//! `triage` - command-line front end for the triage engine.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use triage_core::{Engine, EngineConfig};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_engine(cli: &Cli) -> Result<Engine> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    Engine::new(config).context("Failed to build engine")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = load_engine(&cli)?;
    tracing::debug!(
        pattern_set = engine.detector().version(),
        phrases = engine.detector().len(),
        "Engine ready"
    );

    match &cli.command {
        Commands::Detect { text } => commands::detect(&engine, text, cli.json),
        Commands::Route {
            phq9,
            gad7,
            age_band,
        } => commands::route(&engine, phq9, gad7, age_band, cli.json),
        Commands::CrisisResponse {
            country,
            resources_dir,
        } => commands::crisis_response(&engine, country, resources_dir.as_deref(), cli.json),
        Commands::Questions { instrument } => commands::questions(&engine, instrument, cli.json),
        Commands::Resources {
            country,
            resources_dir,
        } => commands::resources(country, resources_dir.as_deref()),
        Commands::Intake {
            text,
            country,
            resources_dir,
        } => {
            commands::intake(
                engine,
                text,
                country.as_deref(),
                resources_dir.as_deref(),
                cli.json,
            )
            .await
        }
    }
}
