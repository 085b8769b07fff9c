//! Data models for shelf
//!
//! Defines the catalog record and its closed enumerations. Records are
//! persisted as-is through serde, so field order here is the key order of
//! the JSON store.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CatalogError;

/// Reading / registration state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unread,
    Reading,
    Read,
    /// Document registry: filed and current
    Registered,
    /// Document registry: kept for reference only
    Archived,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Unread,
        Status::Reading,
        Status::Read,
        Status::Registered,
        Status::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unread => "unread",
            Status::Reading => "reading",
            Status::Read => "read",
            Status::Registered => "registered",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| CatalogError::invalid_choice("status", s, &Status::ALL))
    }
}

/// Priority used for ordering the reading queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank, lower sorts first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == wanted)
            .ok_or_else(|| CatalogError::invalid_choice("priority", s, &Priority::ALL))
    }
}

/// A catalog entry: a book or a registered document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Stable surrogate identifier
    pub id: Uuid,
    /// Display title, unique within the catalog ignoring case
    pub title: String,
    pub author: String,
    /// Genre for books, category for documents
    pub category: String,
    pub published_year: String,
    pub language: String,
    pub status: Status,
    /// Missing only in stores written before priorities existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Why this record is in the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Absolute path to the source artifact (PDF, scan, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Physical location of a paper document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Normalized key of this record's title
    pub fn key(&self) -> String {
        normalize_title(&self.title)
    }

    /// Check whether `query` names this record
    ///
    /// Matches the title ignoring case, or the normalized key.
    pub fn matches_title(&self, query: &str) -> bool {
        let query = query.trim();
        self.title.to_lowercase() == query.to_lowercase() || self.key() == normalize_title(query)
    }
}

/// Input for creating a record
///
/// Anything left as `None` is filled in from the catalog's [`Defaults`].
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<String>,
    pub language: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub reason: Option<String>,
    pub path: Option<PathBuf>,
    pub location: Option<String>,
}

impl NewRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build the persisted record, substituting defaults for absent fields
    pub fn into_record(self, defaults: &Defaults) -> Record {
        let now = Utc::now();
        Record {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            author: non_blank(self.author).unwrap_or_else(|| defaults.author.clone()),
            category: non_blank(self.category).unwrap_or_else(|| defaults.category.clone()),
            published_year: non_blank(self.published_year)
                .unwrap_or_else(|| defaults.published_year.clone()),
            language: non_blank(self.language).unwrap_or_else(|| defaults.language.clone()),
            status: self.status.unwrap_or(defaults.status),
            priority: Some(self.priority.unwrap_or(defaults.priority)),
            description: non_blank(self.description),
            reason: non_blank(self.reason),
            path: self.path,
            location: non_blank(self.location),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field changes for an update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<String>,
    pub language: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub reason: Option<String>,
    pub path: Option<PathBuf>,
    pub location: Option<String>,
}

impl RecordChanges {
    /// True when no field was supplied at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the supplied fields to `record`
    ///
    /// Returns the names of the fields whose value actually changed.
    pub fn apply_to(&self, record: &mut Record) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if let Some(title) = non_blank(self.title.clone()) {
            if title != record.title {
                record.title = title;
                changed.push("title");
            }
        }
        set_text(&mut record.author, &self.author, "author", &mut changed);
        set_text(&mut record.category, &self.category, "category", &mut changed);
        set_text(
            &mut record.published_year,
            &self.published_year,
            "published_year",
            &mut changed,
        );
        set_text(&mut record.language, &self.language, "language", &mut changed);

        if let Some(status) = self.status {
            if status != record.status {
                record.status = status;
                changed.push("status");
            }
        }
        if let Some(priority) = self.priority {
            if record.priority != Some(priority) {
                record.priority = Some(priority);
                changed.push("priority");
            }
        }

        set_optional(&mut record.description, &self.description, "description", &mut changed);
        set_optional(&mut record.reason, &self.reason, "reason", &mut changed);
        set_optional(&mut record.location, &self.location, "location", &mut changed);

        if let Some(ref path) = self.path {
            if record.path.as_ref() != Some(path) {
                record.path = Some(path.clone());
                changed.push("path");
            }
        }

        if !changed.is_empty() {
            record.updated_at = Utc::now();
        }
        changed
    }
}

fn set_text(
    field: &mut String,
    value: &Option<String>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = non_blank(value.clone()) {
        if *field != value {
            *field = value;
            changed.push(name);
        }
    }
}

fn set_optional(
    field: &mut Option<String>,
    value: &Option<String>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = non_blank(value.clone()) {
        if field.as_deref() != Some(value.as_str()) {
            *field = Some(value);
            changed.push(name);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Values substituted for fields left out of [`NewRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub author: String,
    pub category: String,
    pub published_year: String,
    pub language: String,
    pub status: Status,
    pub priority: Priority,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            author: "Unknown Author".to_string(),
            category: "General".to_string(),
            published_year: "Unknown".to_string(),
            language: "en".to_string(),
            status: Status::Unread,
            priority: Priority::Low,
        }
    }
}

/// Normalize a title into its uniqueness key
///
/// Trims, lowercases and joins whitespace-separated words with `_`, so
/// "The  Rust Book" and "the rust book" share the key `the_rust_book`.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}
