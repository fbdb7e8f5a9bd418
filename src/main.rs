mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use oddsforge_parlay::models::League;
use oddsforge_parlay::{AppController, ClientConfig, HttpBackend};

#[derive(Parser)]
#[command(name = "oddsforge-parlay")]
#[command(about = "Browse match predictions and build parlays")]
struct Cli {
    /// Backend base URL (overrides PARLAY_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides PARLAY_HTTP_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported league filters
    Leagues,
    /// List upcoming matches
    Matches {
        #[arg(short, long, default_value = "ALL")]
        league: League,
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Show predictions for a match, grouped by market
    Predict {
        #[arg(short, long, default_value = "ALL")]
        league: League,
        #[arg(short, long = "match")]
        match_id: String,
    },
    /// Build a parlay from predictions of one match
    Parlay {
        #[arg(short, long, default_value = "ALL")]
        league: League,
        #[arg(short, long = "match")]
        match_id: String,
        /// Event name to add as a leg (repeatable)
        #[arg(short, long = "pick")]
        picks: Vec<String>,
        /// Reference stake for the payout
        #[arg(short, long)]
        stake: Option<f64>,
        /// Write the slip to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("oddsforge_parlay=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    match cli.command {
        Some(Commands::Leagues) | None => {
            cli::list_leagues();
        }
        Some(Commands::Matches { league, days }) => {
            if let Some(days) = days {
                config.lookahead_days = days;
            }
            let app = controller(&config)?;
            cli::show_matches(&app, league).await?;
        }
        Some(Commands::Predict { league, match_id }) => {
            let app = controller(&config)?;
            cli::show_predictions(&app, league, &match_id).await?;
        }
        Some(Commands::Parlay {
            league,
            match_id,
            picks,
            stake,
            export,
        }) => {
            if let Some(stake) = stake {
                config.unit_stake = stake;
            }
            let app = controller(&config)?;
            cli::build_parlay(&app, league, &match_id, &picks, export.as_deref()).await?;
        }
    }

    Ok(())
}

fn controller(config: &ClientConfig) -> Result<AppController<HttpBackend>> {
    tracing::debug!("Using backend {} (timeout {:?})", config.api_url, config.timeout);
    let backend = HttpBackend::from_config(config)?;
    Ok(AppController::new(Arc::new(backend), config))
}
