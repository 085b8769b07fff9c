//! Storage layer
//!
//! Loads and rewrites the full record collection.
//!
//! ## Backends
//!
//! - **JSON**: a single array file, replaced atomically (temp file + rename)
//! - **SQLite**: `categories` + `records` tables, rewritten in one transaction
//!
//! Files can also be copied into a per-category archive folder
//! ([`archive_file`]).
//!
//! A missing store loads as an empty collection and is created on the first
//! save. A store that exists but cannot be parsed is reported as
//! [`StorageError::CorruptStore`] and never overwritten.

pub mod archive;
pub mod error;
pub mod json;
pub mod schema;
pub mod sqlite;

use std::path::Path;

use crate::config::{Backend, Config};
use crate::models::Record;

pub use archive::archive_file;
pub use error::{StorageError, StorageResult};
pub use json::JsonStore;
pub use sqlite::SqliteStore;

/// A file-backed home for the record collection
pub trait RecordStore {
    /// Read every record; an absent store yields an empty collection
    fn load(&self) -> StorageResult<Vec<Record>>;

    /// Replace the stored collection with `records`
    fn save(&self, records: &[Record]) -> StorageResult<()>;

    /// Path of the backing file
    fn location(&self) -> &Path;

    /// Short backend name for diagnostics
    fn backend(&self) -> Backend;

    /// Check if the backing file exists yet
    fn exists(&self) -> bool {
        self.location().exists()
    }
}

/// Open the store selected by the configuration
pub fn open_store(config: &Config) -> Box<dyn RecordStore> {
    let path = config.store_path();
    match config.backend {
        Backend::Json => Box::new(JsonStore::new(path)),
        Backend::Sqlite => Box::new(SqliteStore::new(path)),
    }
}
