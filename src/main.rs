//! Gurume main entry point
//!
//! This is the command-line interface for the Gurume restaurant catalog
//! crawler.

use anyhow::bail;
use clap::{ArgGroup, Parser};
use gurume::config::catalog::{city_listing_url, food_listing_url, known_cities};
use gurume::config::{load_config, Config};
use gurume::crawler::{crawl, CrawlRequest};
use gurume::storage::{open_store, Store};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gurume: a restaurant catalog crawler
///
/// Gurume walks paginated listing pages of a restaurant directory, fetches
/// every detail page not yet stored, and persists structured records in
/// SQLite.
#[derive(Parser, Debug)]
#[command(name = "gurume")]
#[command(about = "Restaurant catalog crawler", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["city", "food", "stats"])))]
struct Cli {
    /// City to crawl restaurants from
    #[arg(long, value_parser = parse_city)]
    city: Option<String>,

    /// Food term to search for (e.g. pizza, sushi, ramen)
    #[arg(short, long)]
    food: Option<String>,

    /// Number of listing pages to walk
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the database path from the configuration
    #[arg(long)]
    db: Option<String>,

    /// Print stored-record statistics and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Validates a city argument against the known slugs
fn parse_city(value: &str) -> Result<String, String> {
    let city = value.to_lowercase();
    if known_cities().contains(&city.as_str()) {
        Ok(city)
    } else {
        Err(format!(
            "unknown city '{}'; known cities: {}",
            value,
            known_cities().join(", ")
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };
    if let Some(db) = &cli.db {
        config.storage.database_path = db.clone();
    }

    if cli.stats {
        return print_stats(&config);
    }

    let (base_url, search_term) = if let Some(city) = &cli.city {
        let url = match city_listing_url(&config.catalog.base_url, city) {
            Some(url) => url,
            None => bail!("unknown city: {}", city),
        };
        (url, city.clone())
    } else if let Some(food) = &cli.food {
        (food_listing_url(&config.catalog.base_url, food), food.clone())
    } else {
        bail!("either --city or --food must be provided");
    };

    let request = CrawlRequest {
        base_url,
        page_count: cli.pages,
        search_term,
    };
    tracing::info!(
        "Starting crawl for {} ({} pages)",
        request.search_term,
        request.page_count
    );

    tokio::select! {
        result = crawl(&config, &request) => {
            let total = result?;
            tracing::info!("Scraping completed. Total restaurants in database: {}", total);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Crawl interrupted by user");
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gurume=info,warn"),
            1 => EnvFilter::new("gurume=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Handles the --stats mode: prints stored-record statistics and exits
fn print_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.storage.database_path))?;

    println!("Database: {}", config.storage.database_path);
    println!("Total records: {}", store.record_count()?);

    let by_area = store.counts_by_area()?;
    if !by_area.is_empty() {
        println!("\nRecords by area:");
        for (area, count) in by_area {
            println!("  {:<12} {}", area, count);
        }
    }

    Ok(())
}
