//! SQLite schema for the relational backend
//!
//! Two tables: `categories` holds each distinct category name once and
//! `records` points at it. `position` keeps the catalog's insertion order.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            position INTEGER PRIMARY KEY,
            id TEXT UNIQUE NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            published_year TEXT NOT NULL,
            language TEXT NOT NULL,
            status TEXT NOT NULL
                CHECK (status IN ('unread', 'reading', 'read', 'registered', 'archived')),
            priority TEXT
                CHECK (priority IS NULL OR priority IN ('high', 'medium', 'low')),
            description TEXT,
            reason TEXT,
            path TEXT,
            location TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_category_id ON records(category_id);
        CREATE INDEX IF NOT EXISTS idx_records_status ON records(status);
        CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
///
/// Errors (such as a file that is not a database) are returned rather than
/// treated as "needs init", so a foreign file is never initialized over.
pub fn needs_init(conn: &Connection) -> Result<bool> {
    let table_exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")?
        .exists([])?;

    if !table_exists {
        return Ok(true);
    }

    Ok(match get_schema_version(conn)? {
        Some(v) => v < SCHEMA_VERSION,
        None => true,
    })
}
