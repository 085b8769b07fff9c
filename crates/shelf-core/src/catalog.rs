//! Catalog operations
//!
//! The `Catalog` wraps a [`RecordStore`] and owns the rules of the
//! collection: required fields, title uniqueness, partial updates.
//!
//! Every mutating call loads the current store, changes it in memory and
//! rewrites the whole store once. A call that fails returns before the
//! rewrite, so the store is either fully updated or untouched.
//!
//! ## Usage
//!
//! ```ignore
//! let mut catalog = Catalog::open(&config);
//!
//! catalog.add(NewRecord::new("Dune"))?;
//!
//! let unread = catalog.filter(&Filter::new().status(Status::Unread))?;
//! ```
//!
//! Concurrent invocations against the same store are not coordinated: two
//! processes doing load-modify-save at the same time means the last save
//! wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{normalize_title, Defaults, NewRecord, Record, RecordChanges, Status};
use crate::query::{self, Filter};
use crate::storage::{archive_file, open_store, RecordStore};

/// Result of an update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// At least one field changed and the store was rewritten
    Updated {
        record: Record,
        changed: Vec<&'static str>,
    },
    /// Nothing differed from the stored record; the store was not touched
    Unchanged(Record),
}

/// Record counts for status reporting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

/// The record collection and its operations
pub struct Catalog {
    store: Box<dyn RecordStore>,
    defaults: Defaults,
    archive_dir: Option<PathBuf>,
}

impl Catalog {
    /// Open the catalog described by the configuration
    pub fn open(config: &Config) -> Self {
        Self::with_store(open_store(config), config.defaults.clone())
            .with_archive_dir(config.archive_dir())
    }

    /// Build a catalog over an explicit store
    ///
    /// Archiving is unavailable until [`Catalog::with_archive_dir`] is set.
    pub fn with_store(store: Box<dyn RecordStore>, defaults: Defaults) -> Self {
        Self {
            store,
            defaults,
            archive_dir: None,
        }
    }

    /// Set the folder that archived files are copied into
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Get the backing store
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    // ==================== Mutations ====================

    /// Add a new record
    ///
    /// Fails with `Validation` for a blank title, `MissingFile` when the
    /// artifact path does not exist, and `DuplicateRecord` when another
    /// record already uses the same normalized title.
    pub fn add(&mut self, input: NewRecord) -> CatalogResult<Record> {
        self.insert(input, false)
    }

    /// Add a new record, copying its file into the category's archive folder
    ///
    /// The stored path is the copy. Fails with `Validation` when the input
    /// has no file.
    pub fn add_archived(&mut self, input: NewRecord) -> CatalogResult<Record> {
        if input.path.is_none() {
            return Err(CatalogError::missing_field("file"));
        }
        self.insert(input, true)
    }

    fn insert(&mut self, input: NewRecord, archive: bool) -> CatalogResult<Record> {
        if input.title.trim().is_empty() {
            return Err(CatalogError::missing_field("title"));
        }
        if let Some(ref path) = input.path {
            if !path.is_file() {
                return Err(CatalogError::MissingFile { path: path.clone() });
            }
        }

        let mut records = self.store.load()?;
        let key = normalize_title(&input.title);
        if let Some(existing) = records.iter().find(|r| r.key() == key) {
            return Err(CatalogError::DuplicateRecord {
                title: existing.title.clone(),
            });
        }

        let mut record = input.into_record(&self.defaults);
        let copy = match (archive, record.path.as_deref()) {
            (true, Some(path)) => Some(self.archive(path, &record.category)?),
            _ => None,
        };
        if let Some(ref copy) = copy {
            record.path = Some(copy.clone());
        }

        records.push(record.clone());
        self.save_or_discard(&records, copy.as_deref())?;

        info!("Added record '{}' ({})", record.title, record.id);
        Ok(record)
    }

    /// Update the record named `title` with the supplied field changes
    ///
    /// Only fields present in `changes` are touched. When none of them
    /// differs from the stored value the store is not rewritten.
    pub fn update(&mut self, title: &str, changes: RecordChanges) -> CatalogResult<UpdateOutcome> {
        self.modify(title, changes, false)
    }

    /// Update a record, then archive its file under its (possibly new) category
    ///
    /// A file that is already in that archive folder is not copied again.
    /// Fails with `Validation` when the record ends up without a file.
    pub fn update_archived(
        &mut self,
        title: &str,
        changes: RecordChanges,
    ) -> CatalogResult<UpdateOutcome> {
        self.modify(title, changes, true)
    }

    fn modify(
        &mut self,
        title: &str,
        changes: RecordChanges,
        archive: bool,
    ) -> CatalogResult<UpdateOutcome> {
        if let Some(ref path) = changes.path {
            if !path.is_file() {
                return Err(CatalogError::MissingFile { path: path.clone() });
            }
        }

        let mut records = self.store.load()?;
        let index = records
            .iter()
            .position(|r| r.matches_title(title))
            .ok_or_else(|| CatalogError::RecordNotFound {
                title: title.to_string(),
            })?;

        if let Some(ref new_title) = changes.title {
            let key = normalize_title(new_title);
            if key.is_empty() {
                return Err(CatalogError::missing_field("title"));
            }
            let taken = records
                .iter()
                .enumerate()
                .any(|(i, r)| i != index && r.key() == key);
            if taken {
                return Err(CatalogError::DuplicateRecord {
                    title: new_title.trim().to_string(),
                });
            }
        }

        let mut updated = records[index].clone();
        let mut changed = changes.apply_to(&mut updated);

        let mut copy = None;
        if archive {
            let Some(path) = updated.path.clone() else {
                return Err(CatalogError::missing_field("file"));
            };
            let archived = self.archive(&path, &updated.category)?;
            if archived != path {
                updated.path = Some(archived.clone());
                updated.updated_at = Utc::now();
                if !changed.contains(&"path") {
                    changed.push("path");
                }
                copy = Some(archived);
            }
        }

        let record = updated.clone();
        records[index] = updated;

        if changed.is_empty() {
            debug!("Update of '{}' changed nothing", record.title);
            return Ok(UpdateOutcome::Unchanged(record));
        }

        self.save_or_discard(&records, copy.as_deref())?;
        info!("Updated record '{}': {}", record.title, changed.join(", "));
        Ok(UpdateOutcome::Updated { record, changed })
    }

    /// Delete the first record named `title`
    pub fn delete(&mut self, title: &str) -> CatalogResult<Record> {
        let mut records = self.store.load()?;
        let index = records
            .iter()
            .position(|r| r.matches_title(title))
            .ok_or_else(|| CatalogError::RecordNotFound {
                title: title.to_string(),
            })?;

        let removed = records.remove(index);
        self.store.save(&records)?;

        info!("Deleted record '{}' ({})", removed.title, removed.id);
        Ok(removed)
    }

    /// Move every record in category `old` (ignoring case) to `new`
    ///
    /// All matching records are rewritten in one save. Returns how many
    /// records changed; when none did, the store is not touched.
    pub fn rename_category(&mut self, old: &str, new: &str) -> CatalogResult<usize> {
        let new = new.trim();
        if new.is_empty() {
            return Err(CatalogError::missing_field("category"));
        }
        self.recategorize(old, new)
    }

    /// Reassign every record in category `name` to the default category
    ///
    /// Categories only exist through their records, so this is what removes
    /// one. The default category itself cannot be deleted.
    pub fn delete_category(&mut self, name: &str) -> CatalogResult<usize> {
        let fallback = self.defaults.category.clone();
        if same_category(name, &fallback) {
            return Err(CatalogError::Validation {
                field: "category",
                message: format!("'{}' is the default category and cannot be deleted", fallback),
            });
        }
        self.recategorize(name, &fallback)
    }

    fn recategorize(&mut self, from: &str, to: &str) -> CatalogResult<usize> {
        let mut records = self.store.load()?;
        let now = Utc::now();
        let mut moved = 0;
        for record in records
            .iter_mut()
            .filter(|r| same_category(&r.category, from) && r.category != to)
        {
            record.category = to.to_string();
            record.updated_at = now;
            moved += 1;
        }

        if moved == 0 {
            debug!("No records in category '{}'", from.trim());
            return Ok(0);
        }

        self.store.save(&records)?;
        info!("Moved {} record(s) from category '{}' to '{}'", moved, from.trim(), to);
        Ok(moved)
    }

    fn archive(&self, path: &Path, category: &str) -> CatalogResult<PathBuf> {
        let Some(ref dir) = self.archive_dir else {
            return Err(CatalogError::Validation {
                field: "file",
                message: "no archive directory is configured".to_string(),
            });
        };
        Ok(archive_file(path, dir, category)?)
    }

    /// Save `records`, removing a freshly archived copy if the save fails
    fn save_or_discard(&self, records: &[Record], copy: Option<&Path>) -> CatalogResult<()> {
        if let Err(e) = self.store.save(records) {
            if let Some(copy) = copy {
                if let Err(remove) = fs::remove_file(copy) {
                    warn!("Could not remove archived copy {:?}: {}", copy, remove);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Get every record in store order
    pub fn all(&self) -> CatalogResult<Vec<Record>> {
        Ok(self.store.load()?)
    }

    /// Find the first record whose title matches, ignoring case
    pub fn find_by_title(&self, title: &str) -> CatalogResult<Option<Record>> {
        Ok(self
            .store
            .load()?
            .into_iter()
            .find(|r| r.matches_title(title)))
    }

    /// Get the record named `title`, or `RecordNotFound`
    pub fn get(&self, title: &str) -> CatalogResult<Record> {
        self.find_by_title(title)?
            .ok_or_else(|| CatalogError::RecordNotFound {
                title: title.to_string(),
            })
    }

    /// Records matching every predicate of `filter`
    pub fn filter(&self, filter: &Filter) -> CatalogResult<Vec<Record>> {
        Ok(query::apply(self.store.load()?, filter))
    }

    /// Records whose title, author or category contains `term`
    pub fn search(&self, term: &str) -> CatalogResult<Vec<Record>> {
        Ok(query::search(self.store.load()?, term))
    }

    /// Distinct categories with their record counts, alphabetically
    pub fn categories(&self) -> CatalogResult<Vec<(String, usize)>> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in self.store.load()? {
            *counts.entry(record.category).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    /// Total and per-status record counts
    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        let records = self.store.load()?;
        let mut by_status = BTreeMap::new();
        for status in Status::ALL {
            let count = records.iter().filter(|r| r.status == status).count();
            if count > 0 {
                by_status.insert(status.as_str(), count);
            }
        }
        Ok(CatalogStats {
            total: records.len(),
            by_status,
        })
    }
}

fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
