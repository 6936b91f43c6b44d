//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Gurume database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per catalog entry, unique on the source URL
CREATE TABLE IF NOT EXISTS restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name_en TEXT,
    name_local TEXT,
    rating REAL,
    review_count INTEGER NOT NULL DEFAULT 0,
    address TEXT,
    city TEXT,
    region TEXT,
    latitude REAL,
    longitude REAL,
    price_lunch TEXT,
    price_dinner TEXT,
    url TEXT NOT NULL UNIQUE,
    area TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_restaurants_area ON restaurants(area);

-- Normalized category names, created lazily on first sighting
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Many-to-many association between restaurants and categories
CREATE TABLE IF NOT EXISTS restaurant_categories (
    restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    PRIMARY KEY (restaurant_id, category_id)
);

-- Append-only diagnostic log; never read back by the crawl
CREATE TABLE IF NOT EXISTS error_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    error_type TEXT NOT NULL,
    error_message TEXT NOT NULL,
    url TEXT,
    timestamp TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on every process start; all statements are idempotent.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = vec![
            "restaurants",
            "categories",
            "restaurant_categories",
            "error_logs",
        ];

        for table in tables {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_url_uniqueness_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO restaurants (url, area, created_at) VALUES ('https://x/1', 'tokyo', 'now')",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO restaurants (url, area, created_at) VALUES ('https://x/1', 'tokyo', 'now')",
            [],
        );

        assert!(duplicate.is_err());
    }
}
