//! Catalog error taxonomy
//!
//! Every catalog operation either commits one store rewrite or fails with one
//! of these kinds before touching the store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Bad enum value or missing required field
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A record with the same normalized title already exists
    #[error("A record titled '{title}' already exists")]
    DuplicateRecord { title: String },

    /// No record matched the given title
    #[error("No record found with title '{title}'")]
    RecordNotFound { title: String },

    /// A file argument does not point at an existing file
    #[error("File not found: '{path}'")]
    MissingFile { path: PathBuf },

    /// Backing store failure (including a corrupt store)
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    /// Validation error for a value outside a closed set
    pub fn invalid_choice<T: fmt::Display>(field: &'static str, value: &str, allowed: &[T]) -> Self {
        let allowed = allowed
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        CatalogError::Validation {
            field,
            message: format!("'{}' is not valid, expected one of: {}", value, allowed),
        }
    }

    /// Validation error for an absent or blank required field
    pub fn missing_field(field: &'static str) -> Self {
        CatalogError::Validation {
            field,
            message: "a non-empty value is required".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::RecordNotFound { .. })
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_choice_message() {
        let err = CatalogError::invalid_choice("status", "done", &["unread", "reading", "read"]);
        assert_eq!(
            err.to_string(),
            "Invalid status: 'done' is not valid, expected one of: unread, reading, read"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = CatalogError::missing_field("title");
        assert!(err.to_string().contains("title"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: CatalogError = StorageError::CorruptStore {
            path: PathBuf::from("/data/catalog.json"),
            details: "expected value at line 1".to_string(),
        }
        .into();
        assert!(err.to_string().contains("corrupt"));
    }
}
