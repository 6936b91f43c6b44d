//! Crawl coordination - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Walking paginated listing pages
//! - Gating detail fetches on the dedup check
//! - Fanning detail pages out as independent units of work
//! - Pacing page transitions
//! - Per-page and end-of-run reporting

use crate::config::catalog::{area_from_url, page_url};
use crate::config::Config;
use crate::crawler::extract::{extract_listing_urls, extract_record};
use crate::crawler::Fetcher;
use crate::storage::{ErrorKind, SqliteStore, Store};
use crate::GurumeError;
use rand::Rng;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One crawl order: where to start and how many listing pages to walk
///
/// Immutable for the duration of the run; never persisted.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Seed listing URL, already resolved from a city or food term
    pub base_url: String,

    /// Number of listing pages to walk
    pub page_count: u32,

    /// The city or food term this crawl was started for (reporting only)
    pub search_term: String,
}

/// Drives a crawl run: listing pages in, stored records out
pub struct Coordinator {
    fetcher: Arc<Fetcher>,
    store: Arc<Mutex<SqliteStore>>,
}

impl Coordinator {
    /// Opens the store and builds the fetcher
    ///
    /// Store initialization is the only fatal failure in the system; it
    /// surfaces to the caller instead of degrading the run.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run crawls
    /// * `Err(GurumeError)` - Store or client initialization failed
    pub fn new(config: &Config) -> Result<Self, GurumeError> {
        let store = SqliteStore::new(Path::new(&config.storage.database_path))?;
        let fetcher = Fetcher::new(config.fetch.clone())?;

        Ok(Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(Mutex::new(store)),
        })
    }

    /// Walks the listing pages of `request` and returns the total number of
    /// stored records at the end of the run
    ///
    /// Failure semantics: a single detail-page failure is recorded and
    /// skipped; a listing-page failure yields zero URLs for that page and
    /// the run proceeds. Errors degrade the yield, never the run.
    pub async fn run(&self, request: &CrawlRequest) -> Result<u64, GurumeError> {
        tracing::info!("Starting crawl for search term: {}", request.search_term);

        for page in 1..=request.page_count {
            let urls = self.listing_urls(&request.base_url, page).await;

            let mut handles = Vec::new();
            for url in &urls {
                if self.already_stored(url) {
                    tracing::debug!("Skipping already stored URL: {}", url);
                    continue;
                }

                let fetcher = Arc::clone(&self.fetcher);
                let store = Arc::clone(&self.store);
                let url = url.clone();
                handles.push(tokio::spawn(process_detail(fetcher, store, url)));
            }

            let mut inserted = 0u32;
            for handle in handles {
                match handle.await {
                    Ok(true) => inserted += 1,
                    Ok(false) => {}
                    Err(e) => tracing::warn!("Detail task failed: {}", e),
                }
            }

            tracing::info!(
                "Page {}: found {} restaurants, {} new entries added",
                page,
                urls.len(),
                inserted
            );

            // Politeness pause between listing pages, distinct from the
            // fetcher's per-request delay.
            if page < request.page_count {
                let pause = Duration::from_secs_f64(rand::thread_rng().gen_range(1.0..2.0));
                tokio::time::sleep(pause).await;
            }
        }

        let total = {
            let store = self.store.lock().unwrap();
            store.record_count()?
        };
        tracing::info!("Crawl completed. Total records in store: {}", total);
        Ok(total)
    }

    /// Fetches one listing page and extracts its detail URLs
    ///
    /// A failed fetch or an empty page yields no URLs; both leave a
    /// diagnostic row behind and the run moves on to the next page.
    async fn listing_urls(&self, base_url: &str, page: u32) -> Vec<String> {
        let url = page_url(base_url, page);

        let html = match self.fetcher.get(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Listing page {} failed: {}", url, e);
                let mut store = self.store.lock().unwrap();
                store.log_error(ErrorKind::Fetch, &e.to_string(), Some(&url));
                return Vec::new();
            }
        };

        let urls = extract_listing_urls(&html);
        if urls.is_empty() {
            let mut store = self.store.lock().unwrap();
            store.log_error(
                ErrorKind::UrlExtraction,
                &format!("No URLs found on page {}", page),
                Some(&url),
            );
        }
        urls
    }

    /// Dedup gate, checked before any detail fetch
    ///
    /// A failing check is reported as not-stored: the insert's uniqueness
    /// constraint still protects the data, and a storage hiccup must not
    /// silently drop a URL from the run.
    fn already_stored(&self, url: &str) -> bool {
        let store = self.store.lock().unwrap();
        match store.url_exists(url) {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Dedup check failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// One independent unit of work: fetch, extract, and insert a single detail
/// page
///
/// Every failure here is logged and isolated; a unit never takes its
/// siblings down. Returns true when a new record was stored.
async fn process_detail(fetcher: Arc<Fetcher>, store: Arc<Mutex<SqliteStore>>, url: String) -> bool {
    let html = match fetcher.get(&url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Detail fetch failed for {}: {}", url, e);
            let mut store = store.lock().unwrap();
            store.log_error(ErrorKind::Fetch, &e.to_string(), Some(&url));
            return false;
        }
    };

    // The partition tag comes from the URL, independent of extraction; the
    // record falls back to its region or "unknown" when no slug matches.
    let area_hint = area_from_url(&url);

    let record = match extract_record(&html, &url, area_hint) {
        Some(record) => record,
        None => {
            tracing::warn!("No record could be extracted from {}", url);
            let mut store = store.lock().unwrap();
            store.log_error(ErrorKind::Parse, "Detail page missing name container", Some(&url));
            return false;
        }
    };

    tracing::debug!(
        "Storing record with area: {}, city: {:?}, region: {:?}",
        record.area,
        record.city,
        record.region
    );

    let mut store = store.lock().unwrap();
    match store.insert_record(&record) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!("Failed to store record for {}: {}", url, e);
            store.log_error(ErrorKind::Storage, &e.to_string(), Some(&url));
            false
        }
    }
}
