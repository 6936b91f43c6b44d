//! Gurume: a restaurant catalog crawler
//!
//! This crate crawls a listing-based restaurant directory: it discovers
//! detail-page URLs from paginated listing pages, fetches each detail page
//! under rate limits, extracts structured records, and persists them with
//! deduplication by source URL.

pub mod config;
pub mod crawler;
pub mod storage;

use thiserror::Error;

/// Main error type for Gurume operations
#[derive(Debug, Error)]
pub enum GurumeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Gurume operations
pub type Result<T> = std::result::Result<T, GurumeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlRequest, Fetcher};
pub use storage::{Record, SqliteStore, Store};
