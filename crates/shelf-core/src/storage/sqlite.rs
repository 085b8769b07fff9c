//! SQLite persistence
//!
//! Keeps the catalog in a two-table database (`categories`, `records`).
//! A save clears and repopulates `records` inside one transaction, so a
//! failed save leaves the previous catalog in place.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::config::Backend;
use crate::models::{Priority, Record, Status};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{RecordStore, StorageError, StorageResult};

/// Catalog stored in a SQLite database file
pub struct SqliteStore {
    path: PathBuf,
}

/// A `records` row before its text columns are parsed
struct RawRecord {
    id: String,
    title: String,
    author: String,
    category: String,
    published_year: String,
    language: String,
    status: String,
    priority: Option<String>,
    description: Option<String>,
    reason: Option<String>,
    path: Option<String>,
    location: Option<String>,
    created_at: String,
    updated_at: String,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the database, creating the file and schema when `create` is set
    fn connect(&self, create: bool) -> StorageResult<Connection> {
        if create {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        StorageError::CreateDirectory {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
            }
        }

        let flags = if create {
            OpenFlags::default()
        } else {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };
        let conn =
            Connection::open_with_flags(&self.path, flags).map_err(|e| self.classify(e))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| self.classify(e))?;

        if create && needs_init(&conn).map_err(|e| self.classify(e))? {
            init_schema(&conn).map_err(|e| self.classify(e))?;
        }

        Ok(conn)
    }

    /// Map "not a database" style failures to a corrupt store
    fn classify(&self, error: rusqlite::Error) -> StorageError {
        match error {
            rusqlite::Error::SqliteFailure(ref e, ref msg)
                if matches!(e.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) =>
            {
                StorageError::CorruptStore {
                    path: self.path.clone(),
                    details: msg.clone().unwrap_or_else(|| e.to_string()),
                }
            }
            other => StorageError::Database(other),
        }
    }

    fn corrupt(&self, details: String) -> StorageError {
        StorageError::CorruptStore {
            path: self.path.clone(),
            details,
        }
    }

    fn parse_row(&self, raw: RawRecord) -> StorageResult<Record> {
        let id = Uuid::parse_str(&raw.id)
            .map_err(|e| self.corrupt(format!("record id '{}': {}", raw.id, e)))?;
        let status = raw
            .status
            .parse::<Status>()
            .map_err(|e| self.corrupt(e.to_string()))?;
        let priority = raw
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()
            .map_err(|e| self.corrupt(e.to_string()))?;

        Ok(Record {
            id,
            title: raw.title,
            author: raw.author,
            category: raw.category,
            published_year: raw.published_year,
            language: raw.language,
            status,
            priority,
            description: raw.description,
            reason: raw.reason,
            path: raw.path.map(PathBuf::from),
            location: raw.location,
            created_at: self.parse_timestamp(&raw.created_at)?,
            updated_at: self.parse_timestamp(&raw.updated_at)?,
        })
    }

    fn parse_timestamp(&self, value: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| self.corrupt(format!("timestamp '{}': {}", value, e)))
    }
}

impl RecordStore for SqliteStore {
    fn load(&self) -> StorageResult<Vec<Record>> {
        if !self.path.exists() {
            debug!("No database at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let conn = self.connect(false)?;
        if needs_init(&conn).map_err(|e| self.classify(e))? {
            return Ok(Vec::new());
        }

        let mut stmt = conn
            .prepare(
                "SELECT r.id, r.title, r.author, COALESCE(c.name, ''), r.published_year,
                        r.language, r.status, r.priority, r.description, r.reason,
                        r.path, r.location, r.created_at, r.updated_at
                 FROM records r
                 LEFT JOIN categories c ON r.category_id = c.id
                 ORDER BY r.position",
            )
            .map_err(|e| self.classify(e))?;

        let raw_rows = stmt
            .query_map([], |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    category: row.get(3)?,
                    published_year: row.get(4)?,
                    language: row.get(5)?,
                    status: row.get(6)?,
                    priority: row.get(7)?,
                    description: row.get(8)?,
                    reason: row.get(9)?,
                    path: row.get(10)?,
                    location: row.get(11)?,
                    created_at: row.get(12)?,
                    updated_at: row.get(13)?,
                })
            })
            .map_err(|e| self.classify(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.classify(e))?;

        let records = raw_rows
            .into_iter()
            .map(|raw| self.parse_row(raw))
            .collect::<StorageResult<Vec<_>>>()?;

        debug!("Loaded {} record(s) from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        let mut conn = self.connect(true)?;
        let tx = conn.transaction()?;
        write_records(&tx, records)?;
        tx.commit()?;

        debug!("Saved {} record(s) to {:?}", records.len(), self.path);
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }
}

/// Replace all rows with `records`, keeping category ids that stay in use
fn write_records(tx: &Transaction, records: &[Record]) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM records", [])?;

    for (position, record) in records.iter().enumerate() {
        tx.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
            [&record.category],
        )?;
        let category_id: i64 = tx.query_row(
            "SELECT id FROM categories WHERE name = ?1",
            [&record.category],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO records (position, id, title, author, category_id, published_year,
                                  language, status, priority, description, reason, path,
                                  location, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                position as i64,
                record.id.to_string(),
                record.title,
                record.author,
                category_id,
                record.published_year,
                record.language,
                record.status.as_str(),
                record.priority.map(|p| p.as_str()),
                record.description,
                record.reason,
                record.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
                record.location,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
    }

    tx.execute(
        "DELETE FROM categories WHERE id NOT IN (SELECT category_id FROM records)",
        [],
    )?;

    Ok(())
}
