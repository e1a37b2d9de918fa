use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use asset_repository::{
    bars::BarsRepository,
    config::{RepositoryConfig, load_config_path},
    repository::Repository,
};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use market_data_provider::providers::alpaca_rest::AlpacaProvider;
use shared_utils::{env::load_dotenv, telemetry::init_tracing};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Query historical price snapshots from Alpaca Markets")]
struct Cli {
    /// Path to a TOML file with request defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print snapshots of an asset as JSON lines, oldest first
    History {
        #[arg(long)]
        asset: String,

        /// Only snapshots at or after this RFC 3339 date
        #[arg(long, conflicts_with = "last_days")]
        since: Option<DateTime<Utc>>,

        /// Only the last N days before the most recent snapshot
        #[arg(long)]
        last_days: Option<u32>,
    },

    /// Print the date of the most recent snapshot of an asset
    LastDate {
        #[arg(long)]
        asset: String,
    },

    /// Print the assets to work on
    Assets,
}

/// `last` moved back by `days` whole days.
fn days_before(last: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|span| last.checked_sub_signed(span))
        .with_context(|| format!("{days} days before {last} is out of range"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = load_dotenv();
    init_tracing();
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => RepositoryConfig::default(),
    };

    let mut provider = AlpacaProvider::new()?;
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url);
    }
    let mut repository = BarsRepository::with_provider(provider);
    config.apply_to(&mut repository.bars_request_template)?;

    let mut out = std::io::stdout().lock();

    match cli.cmd {
        Cmd::History {
            asset,
            since,
            last_days,
        } => {
            let snapshots = match (since, last_days) {
                (Some(since), _) => repository.get_since(&asset, since).await?,
                (None, Some(days)) => {
                    let last = repository.last_date(&asset).await?;
                    repository.get_since(&asset, days_before(last, days)?).await?
                }
                (None, None) => repository.get(&asset).await?,
            };

            let mut count = 0usize;
            for snapshot in snapshots {
                writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
                count += 1;
            }
            info!(asset = %asset, count, "printed snapshots");
        }
        Cmd::LastDate { asset } => {
            let last = repository.last_date(&asset).await?;
            writeln!(out, "{}", last.to_rfc3339())?;
        }
        Cmd::Assets => {
            let assets = match repository.assets().await {
                Ok(assets) => assets,
                Err(e) if e.is_unsupported() => {
                    info!("repository cannot list assets, using configured assets");
                    config.assets.clone()
                }
                Err(e) => return Err(e.into()),
            };
            for asset in assets {
                writeln!(out, "{asset}")?;
            }
        }
    }

    Ok(())
}
