//! Storage error handling
//!
//! One variant per step of a load or save (read, temp write, replace, archive
//! copy), each carrying the path it failed on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create the store or archive directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store file exists but could not be read
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Temp file could not be written or synced
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Temp file could not be renamed over the store
    #[error("Failed to replace '{target}' with '{temp}': {source}")]
    Replace {
        temp: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be copied into the archive
    #[error("Failed to archive '{from}' as '{to}': {source}")]
    Archive {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store exists but cannot be parsed; nothing is written over it
    #[error("Store at '{path}' is corrupt: {details}. It was left untouched.")]
    CorruptStore { path: PathBuf, details: String },

    /// Records could not be serialized
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::CorruptStore { .. })
    }

    /// Kind of the underlying I/O error, if there is one
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StorageError::CreateDirectory { source, .. }
            | StorageError::Read { source, .. }
            | StorageError::Write { source, .. }
            | StorageError::Replace { source, .. }
            | StorageError::Archive { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        if self.io_kind() == Some(io::ErrorKind::PermissionDenied) {
            return Some("Check file and directory permissions of the store location.");
        }
        match self {
            StorageError::CorruptStore { .. } => Some(
                "Fix or restore the store file by hand; shelf refuses to overwrite it while it cannot be read.",
            ),
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::Write { .. } | StorageError::Replace { .. } => {
                Some("Check free disk space; the previous store file is still in place.")
            }
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
