use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitekit_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "sitekit")]
#[command(author, version, about = "Replay scripted browsing sessions against page fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a page fixture and replay its timeline
    Run {
        /// Path to a JSON page fixture
        fixture: PathBuf,
        /// Replay in wall-clock time through the async runtime
        #[arg(long)]
        realtime: bool,
        /// Keep the page running this long after the last event
        #[arg(long, default_value_t = 3000)]
        settle_ms: u64,
    },
    /// Show which features a page fixture enables
    Inspect {
        /// Path to a JSON page fixture
        fixture: PathBuf,
        /// Print the feature summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or clear the persisted cookie acknowledgement
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
    /// Print the config path and effective configuration
    Config,
}

#[derive(Subcommand)]
enum CookieAction {
    /// Show whether cookies have been accepted
    Status,
    /// Forget the acknowledgement
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run {
            fixture,
            realtime,
            settle_ms,
        } => {
            if realtime {
                commands::run::realtime(&config, &fixture, settle_ms).await
            } else {
                commands::run::run(&config, &fixture, settle_ms)
            }
        }
        Commands::Inspect { fixture, json } => commands::inspect::run(&config, &fixture, json),
        Commands::Cookies { action } => match action {
            CookieAction::Status => commands::cookies::status(&config),
            CookieAction::Reset => commands::cookies::reset(&config),
        },
        Commands::Config => commands::config::run(&config),
    }
}
