//! Store trait and error types
//!
//! This module defines the trait interface for persistence backends and
//! associated error types.

use crate::storage::{ErrorKind, Record};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for record persistence backends
///
/// Dedup happens here: `url_exists` gates detail fetches, and `insert_record`
/// treats a unique-constraint race as benign rather than as an error.
pub trait Store {
    /// Returns true when a record with this source URL is already stored
    ///
    /// The coordinator checks this before fetching a detail page so that
    /// known URLs cost no network call.
    fn url_exists(&self, url: &str) -> StoreResult<bool>;

    /// Inserts a record and its categories inside one transaction
    ///
    /// Category resolution is get-or-create by name within the same
    /// transaction, so a half-written record can never be observed.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Record stored
    /// * `Ok(false)` - A record with this URL already exists (benign race
    ///   between the dedup check and the insert, logged as a warning)
    /// * `Err(StoreError)` - Any other persistence failure
    fn insert_record(&mut self, record: &Record) -> StoreResult<bool>;

    /// Total number of stored records
    fn record_count(&self) -> StoreResult<u64>;

    /// Record counts grouped by area, most populous first
    fn counts_by_area(&self) -> StoreResult<Vec<(String, u64)>>;

    /// All records stored under an area, with categories re-assembled
    fn records_by_area(&self, area: &str) -> StoreResult<Vec<Record>>;

    /// Appends a diagnostic row to the error log
    ///
    /// Best-effort: a failure to write the log entry is itself logged and
    /// swallowed, never propagated.
    fn log_error(&mut self, kind: ErrorKind, message: &str, url: Option<&str>);
}
