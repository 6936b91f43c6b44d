use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Gurume
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of requests in flight at once
    #[serde(rename = "concurrent-requests")]
    pub concurrent_requests: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Consecutive transport failures tolerated per URL before giving up
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Fixed pause before each request, in seconds
    #[serde(rename = "delay-between-requests-secs")]
    pub delay_between_requests_secs: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 5,
            request_timeout_secs: 30,
            retry_attempts: 3,
            delay_between_requests_secs: 1.0,
        }
    }
}

impl FetchConfig {
    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fixed per-request throttle as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_between_requests_secs)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "gurume.db".to_string(),
        }
    }
}

/// Catalog endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tabelog.com/en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_crawl_budget() {
        let config = Config::default();
        assert_eq!(config.fetch.concurrent_requests, 5);
        assert_eq!(config.fetch.request_timeout_secs, 30);
        assert_eq!(config.fetch.retry_attempts, 3);
        assert_eq!(config.fetch.delay_between_requests_secs, 1.0);
        assert_eq!(config.storage.database_path, "gurume.db");
    }

    #[test]
    fn test_duration_helpers() {
        let fetch = FetchConfig {
            request_timeout_secs: 5,
            delay_between_requests_secs: 0.5,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.request_timeout(), Duration::from_secs(5));
        assert_eq!(fetch.request_delay(), Duration::from_millis(500));
    }
}
