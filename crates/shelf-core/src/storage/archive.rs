//! File archive
//!
//! Copies a record's file into `<archive_dir>/<category>/`. A name that is
//! already taken gets a numeric suffix (`report.pdf`, `report_1.pdf`,
//! `report_2.pdf`, ...), so an archived file is never overwritten.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::{StorageError, StorageResult};

/// Copy `source` into the archive folder of `category`
///
/// Returns the path of the copy. A file that already lives in that folder is
/// returned as is.
pub fn archive_file(source: &Path, archive_dir: &Path, category: &str) -> StorageResult<PathBuf> {
    let dir = archive_dir.join(category_dir_name(category));

    if source.parent() == Some(dir.as_path()) {
        return Ok(source.to_path_buf());
    }

    let Some(file_name) = source.file_name() else {
        return Err(StorageError::Archive {
            from: source.to_path_buf(),
            to: dir,
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };

    fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
        path: dir.clone(),
        source,
    })?;

    let destination = free_name(&dir, Path::new(file_name));
    fs::copy(source, &destination).map_err(|e| StorageError::Archive {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
    })?;

    debug!("Archived {:?} as {:?}", source, destination);
    Ok(destination)
}

/// Folder name for a category; path separators cannot escape the archive
fn category_dir_name(category: &str) -> String {
    let name: String = category
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}

/// First unused name in `dir`: `name`, then `stem_1.ext`, `stem_2.ext`, ...
fn free_name(dir: &Path, name: &Path) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name.file_stem().unwrap_or(name.as_os_str());
    let extension = name.extension();
    (1..)
        .map(|i| {
            let mut numbered = OsString::from(stem);
            numbered.push(format!("_{}", i));
            if let Some(ext) = extension {
                numbered.push(".");
                numbered.push(ext);
            }
            dir.join(numbered)
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_file(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = temp_dir.path().join("inbox").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_archive_copies_into_category_folder() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("files");
        let source = source_file(&temp_dir, "invoice.pdf", "march");

        let copy = archive_file(&source, &archive, "Taxes").unwrap();

        assert_eq!(copy, archive.join("Taxes").join("invoice.pdf"));
        assert_eq!(fs::read_to_string(&copy).unwrap(), "march");
        // The original stays where it was
        assert!(source.exists());
    }

    #[test]
    fn test_name_collisions_get_numbered() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("files");
        let source = source_file(&temp_dir, "invoice.pdf", "march");

        let first = archive_file(&source, &archive, "Taxes").unwrap();
        fs::write(&source, "april").unwrap();
        let second = archive_file(&source, &archive, "Taxes").unwrap();
        fs::write(&source, "may").unwrap();
        let third = archive_file(&source, &archive, "Taxes").unwrap();

        let dir = archive.join("Taxes");
        assert_eq!(first, dir.join("invoice.pdf"));
        assert_eq!(second, dir.join("invoice_1.pdf"));
        assert_eq!(third, dir.join("invoice_2.pdf"));
        // Earlier copies are never overwritten
        assert_eq!(fs::read_to_string(&first).unwrap(), "march");
        assert_eq!(fs::read_to_string(&second).unwrap(), "april");
        assert_eq!(fs::read_to_string(&third).unwrap(), "may");
    }

    #[test]
    fn test_collision_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("files");
        let source = source_file(&temp_dir, "README", "notes");

        archive_file(&source, &archive, "Notes").unwrap();
        let second = archive_file(&source, &archive, "Notes").unwrap();
        assert_eq!(second, archive.join("Notes").join("README_1"));
    }

    #[test]
    fn test_file_already_in_folder_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("files");
        let source = source_file(&temp_dir, "invoice.pdf", "march");

        let copy = archive_file(&source, &archive, "Taxes").unwrap();
        let again = archive_file(&copy, &archive, "Taxes").unwrap();

        assert_eq!(again, copy);
        assert_eq!(fs::read_dir(archive.join("Taxes")).unwrap().count(), 1);
    }

    #[test]
    fn test_category_cannot_escape_archive() {
        assert_eq!(category_dir_name("Work/2024"), "Work_2024");
        assert_eq!(category_dir_name(".."), "_");
        assert_eq!(category_dir_name(" Libros "), "Libros");
    }

    #[test]
    fn test_missing_source_is_archive_error() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("files");

        let err = archive_file(&temp_dir.path().join("gone.pdf"), &archive, "Taxes").unwrap_err();
        assert!(matches!(err, StorageError::Archive { .. }));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }
}
