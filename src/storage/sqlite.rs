//! SQLite store implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StoreResult};
use crate::storage::{ErrorKind, Record};
use crate::GurumeError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};
use std::path::Path;

/// SQLite store backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// Opens (or creates) the database file and idempotently ensures the
    /// schema exists. This is the only operation whose failure is fatal to
    /// the crawl.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(GurumeError)` - Failed to open database or create the schema
    pub fn new(path: &Path) -> Result<Self, GurumeError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, GurumeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Looks up a category id by name, inserting the row on first sighting
fn get_or_create_category(tx: &Transaction<'_>, name: &str) -> StoreResult<i64> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tx.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
    Ok(tx.last_insert_rowid())
}

/// Checks whether an error is a unique-constraint violation mentioning the
/// given column
fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message)) => {
            e.code == ErrorCode::ConstraintViolation && message.contains(column)
        }
        _ => false,
    }
}

impl Store for SqliteStore {
    fn url_exists(&self, url: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM restaurants WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_record(&mut self, record: &Record) -> StoreResult<bool> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let inserted = tx.execute(
            "INSERT INTO restaurants (
                name_en, name_local, rating, review_count, address,
                city, region, latitude, longitude,
                price_lunch, price_dinner, url, area, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                record.name_en,
                record.name_local,
                record.rating,
                record.review_count,
                record.address,
                record.city,
                record.region,
                record.latitude,
                record.longitude,
                record.price_lunch,
                record.price_dinner,
                record.source_url,
                record.area,
                now
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e, "restaurants.url") => {
                tracing::warn!("Duplicate record URL: {}", record.source_url);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        let restaurant_id = tx.last_insert_rowid();

        for category in &record.categories {
            let category_id = get_or_create_category(&tx, category)?;
            tx.execute(
                "INSERT OR IGNORE INTO restaurant_categories (restaurant_id, category_id)
                 VALUES (?1, ?2)",
                params![restaurant_id, category_id],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn record_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM restaurants", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn counts_by_area(&self) -> StoreResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT area, COUNT(*) as count FROM restaurants
             GROUP BY area ORDER BY count DESC, area ASC",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn records_by_area(&self, area: &str) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.name_en, r.name_local, r.rating, r.review_count, r.address,
                    r.city, r.region, r.latitude, r.longitude,
                    r.price_lunch, r.price_dinner, r.url, r.area,
                    GROUP_CONCAT(c.name)
             FROM restaurants r
             LEFT JOIN restaurant_categories rc ON r.id = rc.restaurant_id
             LEFT JOIN categories c ON rc.category_id = c.id
             WHERE r.area = ?1
             GROUP BY r.id",
        )?;

        let records = stmt
            .query_map(params![area], |row| {
                let categories: Option<String> = row.get(13)?;
                Ok(Record {
                    name_en: row.get(0)?,
                    name_local: row.get(1)?,
                    rating: row.get(2)?,
                    review_count: row.get(3)?,
                    address: row.get(4)?,
                    city: row.get(5)?,
                    region: row.get(6)?,
                    latitude: row.get(7)?,
                    longitude: row.get(8)?,
                    price_lunch: row.get(9)?,
                    price_dinner: row.get(10)?,
                    source_url: row.get(11)?,
                    area: row.get(12)?,
                    categories: categories
                        .map(|joined| joined.split(',').map(str::to_string).collect())
                        .unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn log_error(&mut self, kind: ErrorKind, message: &str, url: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO error_logs (error_type, error_message, url, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![kind.to_db_string(), message, url, now],
        );

        if let Err(e) = result {
            tracing::error!("Failed to write error log entry: {}", e);
        }
    }
}
