//! HTTP fetcher with concurrency gating, pacing, and retry
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Bounded concurrency via a counting semaphore
//! - A fixed per-request throttle layered under the concurrency gate
//! - Retry with capped exponential backoff for transport failures
//! - Rate-limit (429) handling honoring the server's Retry-After
//! - Per-request User-Agent rotation
//!
//! The fetcher has no knowledge of page content; it returns body text or a
//! typed failure.

use crate::config::catalog::{DEFAULT_HEADERS, USER_AGENTS};
use crate::config::FetchConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Maximum backoff between retries, in seconds
const MAX_BACKOFF_SECS: f64 = 300.0;

/// Fallback wait when a 429 response carries no Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Errors produced by fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-retryable response status (404, 403, ...)
    #[error("HTTP {status} for {url}")]
    Rejected { url: String, status: u16 },

    /// Transport failures persisted through every retry attempt
    #[error("Retries exhausted for {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The concurrency gate shut down while waiting for a slot
    #[error("Fetch semaphore closed")]
    Gate,
}

/// Outcome of a single gated request attempt
enum Attempt {
    /// HTTP 200 with the body read
    Body(String),
    /// HTTP 429; wait this long and try again without spending the budget
    RateLimited(Duration),
    /// Connect error, timeout, 5xx, or any other retryable failure
    Transient(String),
}

/// Bounded-concurrency HTTP fetcher
///
/// Any number of callers may call [`get`](Fetcher::get) concurrently; at most
/// `concurrent_requests` network requests are in flight at once, each paced
/// by a fixed delay and carrying a User-Agent drawn from the pool.
pub struct Fetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the HTTP client and the concurrency gate
    ///
    /// # Arguments
    ///
    /// * `config` - Fetch behavior configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Ready to serve requests
    /// * `Err(FetchError)` - The underlying client could not be built
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(fixed_headers())
            .gzip(true)
            .brotli(true)
            .build()?;

        let semaphore = Arc::new(Semaphore::new(config.concurrent_requests as usize));

        Ok(Self {
            client,
            semaphore,
            config,
        })
    }

    /// Fetches a URL and returns the response body text
    ///
    /// # Retry behavior
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body |
    /// | HTTP 429 | Sleep Retry-After (default 60s), retry; budget untouched |
    /// | HTTP 500/502/503/504 | Backoff, retry with budget spent |
    /// | Timeout / connect error | Backoff, retry with budget spent |
    /// | Any other status | Fail immediately, no retry |
    ///
    /// Backoff is `min(300, 2^n + jitter)` seconds with jitter in [0, 1).
    /// After `retry_attempts` consecutive transport failures the fetch soft-
    /// fails with [`FetchError::RetriesExhausted`].
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        let mut retry_count = 0u32;

        loop {
            if retry_count >= self.config.retry_attempts {
                tracing::error!("Max retries exceeded for URL: {}", url);
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: retry_count,
                });
            }

            match self.attempt(url).await? {
                Attempt::Body(body) => return Ok(body),
                Attempt::RateLimited(wait) => {
                    // 429 retries run on an independent, unlimited budget:
                    // the server told us when to come back.
                    tracing::warn!(
                        "Rate limited on {}. Waiting {} seconds...",
                        url,
                        wait.as_secs()
                    );
                    tokio::time::sleep(wait).await;
                }
                Attempt::Transient(reason) => {
                    let wait = backoff_delay(retry_count);
                    tracing::warn!(
                        "{} for {}; waiting {:.2} seconds before retry {}",
                        reason,
                        url,
                        wait.as_secs_f64(),
                        retry_count + 1
                    );
                    tokio::time::sleep(wait).await;
                    retry_count += 1;
                }
            }
        }
    }

    /// Performs one gated request attempt
    ///
    /// The semaphore permit is held for the duration of the attempt only;
    /// every retry re-acquires, so backoff and rate-limit sleeps never block
    /// a concurrency slot.
    async fn attempt(&self, url: &str) -> Result<Attempt, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Gate)?;

        // Fixed throttle, paid while holding the slot.
        tokio::time::sleep(self.config.request_delay()).await;

        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Ok(Attempt::Transient("Request timeout".to_string()))
            }
            Err(e) if e.is_connect() => {
                return Ok(Attempt::Transient(format!("Connection error: {}", e)))
            }
            Err(e) => return Ok(Attempt::Transient(format!("Transport error: {}", e))),
        };

        let status = response.status();

        if status == StatusCode::OK {
            return match response.text().await {
                Ok(body) => Ok(Attempt::Body(body)),
                Err(e) => Ok(Attempt::Transient(format!("Body read error: {}", e))),
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited(retry_after(&response)));
        }

        if matches!(status.as_u16(), 500 | 502 | 503 | 504) {
            return Ok(Attempt::Transient(format!("HTTP {}", status.as_u16())));
        }

        tracing::error!("HTTP {} for URL: {}", status.as_u16(), url);
        Err(FetchError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Computes the backoff delay before retry `retry_count + 1`
///
/// `min(300, 2^retry_count + jitter)` seconds, jitter drawn from [0, 1).
fn backoff_delay(retry_count: u32) -> Duration {
    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
    let secs = (2f64.powi(retry_count as i32) + jitter).min(MAX_BACKOFF_SECS);
    Duration::from_secs_f64(secs)
}

/// Reads the Retry-After header, falling back to 60 seconds
fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Picks a User-Agent string from the pool at random
fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Builds the fixed header set shared by every request
fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in DEFAULT_HEADERS {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fetcher() {
        let fetcher = Fetcher::new(FetchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_backoff_lower_bound_grows() {
        // Jitter aside, each step's floor doubles.
        for retry_count in 0..8 {
            let delay = backoff_delay(retry_count).as_secs_f64();
            let floor = 2f64.powi(retry_count as i32).min(MAX_BACKOFF_SECS);
            assert!(delay >= floor, "retry {}: {} < {}", retry_count, delay, floor);
            assert!(delay <= (floor + 1.0).min(MAX_BACKOFF_SECS));
        }
    }

    #[test]
    fn test_backoff_monotone_floors() {
        let mut previous_floor = 0.0;
        for retry_count in 0..12 {
            let floor = 2f64.powi(retry_count as i32).min(MAX_BACKOFF_SECS);
            assert!(floor >= previous_floor);
            previous_floor = floor;
        }
    }

    #[test]
    fn test_backoff_caps_at_300() {
        // 2^20 far exceeds the cap; the jitter must not push past it.
        let delay = backoff_delay(20).as_secs_f64();
        assert_eq!(delay, MAX_BACKOFF_SECS);
    }

    #[test]
    fn test_user_agent_pool() {
        for _ in 0..20 {
            let ua = random_user_agent();
            assert!(USER_AGENTS.contains(&ua));
        }
    }

    #[test]
    fn test_fixed_headers_present() {
        let headers = fixed_headers();
        assert!(headers.contains_key("accept"));
        assert!(headers.contains_key("accept-language"));
        assert!(!headers.contains_key("user-agent"));
    }
}
