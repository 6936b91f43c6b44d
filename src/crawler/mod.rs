//! Crawler module for page fetching, extraction, and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with concurrency gating and retry
//! - Pure extraction of listing URLs and detail records
//! - Overall crawl coordination

mod coordinator;
mod extract;
mod fetcher;

pub use coordinator::{Coordinator, CrawlRequest};
pub use extract::{extract_listing_urls, extract_record};
pub use fetcher::{FetchError, Fetcher};

use crate::config::Config;
use crate::GurumeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Initialize the store (fatal on failure)
/// 2. Build the HTTP fetcher
/// 3. Walk the listing pages, fetching and storing new detail records
/// 4. Report and return the total stored record count
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - The crawl order (seed URL, page count, search term)
///
/// # Returns
///
/// * `Ok(u64)` - Total records in the store after the run
/// * `Err(GurumeError)` - Initialization failed
pub async fn crawl(config: &Config, request: &CrawlRequest) -> Result<u64, GurumeError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(request).await
}
