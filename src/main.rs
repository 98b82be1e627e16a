use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use log::{LevelFilter, error, warn};
use price_harvester::{HarvesterConfig, ScrapeSettings, ScrapingContext};

/// Scrape the catalog once and print the outcome as JSON.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Scrape at most this many pages.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Proxy for all catalog requests, e.g. http://127.0.0.1:3128
    #[arg(long)]
    proxy: Option<String>,

    /// Token to present; defaults to the configured API_TOKEN.
    #[arg(long, env = "SCRAPE_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = HarvesterConfig::new()?;
    let context = ScrapingContext::new(config).await?;

    let token = cli
        .token
        .unwrap_or_else(|| context.config.api_token.clone());
    let settings = ScrapeSettings {
        max_pages: cli.max_pages,
        proxy: cli.proxy,
    };

    let outcome = context.gateway.start_scrape(&token, settings).await?;
    if outcome.is_degraded() {
        warn!("Pages {:?} could not be scraped; results are incomplete", outcome.failed_pages);
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
