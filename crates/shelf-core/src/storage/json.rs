//! JSON array persistence
//!
//! The whole catalog lives in one JSON array. Saves go through
//! [`atomic_write`] so a reader sees either the previous file or the new one,
//! never a partial write.
//!
//! Storage location: `~/.local/share/shelf/catalog.json` (configurable via `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::Backend;
use crate::models::Record;
use crate::storage::{RecordStore, StorageError, StorageResult};

/// Catalog stored as a pretty-printed JSON array
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for JsonStore {
    fn load(&self) -> StorageResult<Vec<Record>> {
        if !self.path.exists() {
            debug!("No store at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        // Zero-length file counts as an empty catalog
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(|e| StorageError::CorruptStore {
                path: self.path.clone(),
                details: e.to_string(),
            })?;

        debug!("Loaded {} record(s) from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        let bytes = to_pretty_json(records)?;
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} record(s) to {:?}", records.len(), self.path);
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn backend(&self) -> Backend {
        Backend::Json
    }
}

/// Serialize with 4-space indentation; non-ASCII text is written as UTF-8
fn to_pretty_json(records: &[Record]) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory so the rename never crosses filesystems
    let temp_path = path.with_extension("tmp");

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(source) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::Write {
            path: temp_path,
            source,
        });
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::Replace {
            temp: temp_path,
            target: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
