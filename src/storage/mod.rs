//! Storage module for persisting extracted records
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Record persistence with dedup by source URL
//! - Category normalization (get-or-create by name)
//! - Append-only diagnostic error logging

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreError, StoreResult};

use crate::GurumeError;
use std::path::Path;

/// Initializes or opens a store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(GurumeError)` - Failed to initialize; fatal to the crawl
pub fn open_store(path: &Path) -> Result<SqliteStore, GurumeError> {
    SqliteStore::new(path)
}

/// One extracted catalog entry
///
/// Every extraction field is optional except the source URL (the natural
/// key; at most one stored record per URL ever exists) and the area tag.
/// Coordinates are jointly present or jointly absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub name_en: Option<String>,
    pub name_local: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_lunch: Option<String>,
    pub price_dinner: Option<String>,
    /// Natural key; re-crawling a known URL is a no-op, not an update
    pub source_url: String,
    /// Order preserved for display; storage treats this as a set
    pub categories: Vec<String>,
    /// Crawl partition this record was discovered under (city slug,
    /// lowercased region, or "unknown")
    pub area: String,
}

/// Kind tag for append-only rows in the error log
///
/// The error log is a diagnostic side-channel only; the crawl never reads
/// it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UrlExtraction,
    Fetch,
    Parse,
    Storage,
}

impl ErrorKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::UrlExtraction => "URL_EXTRACTION_ERROR",
            Self::Fetch => "FETCH_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::Storage => "STORAGE_ERROR",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "URL_EXTRACTION_ERROR" => Some(Self::UrlExtraction),
            "FETCH_ERROR" => Some(Self::Fetch),
            "PARSE_ERROR" => Some(Self::Parse),
            "STORAGE_ERROR" => Some(Self::Storage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_roundtrip() {
        for kind in &[
            ErrorKind::UrlExtraction,
            ErrorKind::Fetch,
            ErrorKind::Parse,
            ErrorKind::Storage,
        ] {
            let db_str = kind.to_db_string();
            let parsed = ErrorKind::from_db_string(db_str);
            assert_eq!(Some(*kind), parsed);
        }
    }

    #[test]
    fn test_error_kind_invalid() {
        assert_eq!(ErrorKind::from_db_string("invalid"), None);
    }
}
