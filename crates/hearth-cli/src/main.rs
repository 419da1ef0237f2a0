// crates/hearth-cli/src/main.rs
//
// CLI entrypoint for the Hearth web of trust.
//
// Loads configuration, opens the RocksDB ledger, and runs one engine
// operation per invocation: registering genesis nodes, creating and
// revoking vouches, and inspecting trust scores and eligibility.

mod commands;
mod config;
mod output;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use commands::check::CheckCmd;
use commands::eligibility::EligibilityCmd;
use commands::genesis::GenesisCmd;
use commands::revoke::RevokeCmd;
use commands::score::ScoreCmd;
use commands::vouch::VouchCmd;
use config::HearthConfig;
use output::OutputFormat;

use hearth_store::RocksStore;
use hearth_trust::TrustEngine;

/// Hearth CLI: manage a community web of trust.
#[derive(Parser, Debug)]
#[command(
    name = "hearth",
    version = "0.1.0",
    about = "Hearth web-of-trust engine: vouches, trust scores, revocation cascades"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.hearth/config.toml")]
    config: String,

    /// Override the data directory from the configuration file.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Genesis node management: add, list.
    #[command(subcommand)]
    Genesis(GenesisCmd),

    /// Vouch management: create, list.
    #[command(subcommand)]
    Vouch(VouchCmd),

    /// Revoke a vouch and recompute everyone downstream.
    Revoke(RevokeCmd),

    /// Compute (or read from cache) a user's trust score.
    Score(ScoreCmd),

    /// Check whether one user may vouch for another.
    Eligibility(EligibilityCmd),

    /// Check a user's trust against an action threshold.
    Check(CheckCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging is configured from the file, so load it before the subscriber
    // exists and report a failure afterwards.
    let loaded = HearthConfig::load(&cli.config);
    let mut hearth_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => HearthConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&hearth_config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    // CLI --data-dir flag overrides the config file value.
    if let Some(dir) = &cli.data_dir {
        hearth_config.data_dir = dir.clone();
    }

    let data_path = hearth_config.data_path();
    std::fs::create_dir_all(&data_path)?;
    let data_path = data_path
        .to_str()
        .ok_or("Data directory path is not valid UTF-8")?
        .to_string();
    let store = Arc::new(RocksStore::open(&data_path)?);
    tracing::debug!("Opened ledger at {}", data_path);

    let engine = TrustEngine::new(store, hearth_config.trust.clone())?;
    let format = OutputFormat::from_json_flag(cli.json);

    match &cli.command {
        Commands::Genesis(cmd) => commands::genesis::run(&engine, cmd, format).await?,
        Commands::Vouch(cmd) => commands::vouch::run(&engine, cmd, format).await?,
        Commands::Revoke(cmd) => commands::revoke::run(&engine, cmd, format).await?,
        Commands::Score(cmd) => commands::score::run(&engine, cmd, format).await?,
        Commands::Eligibility(cmd) => commands::eligibility::run(&engine, cmd, format).await?,
        Commands::Check(cmd) => commands::check::run(&engine, cmd, format).await?,
    }

    Ok(())
}
