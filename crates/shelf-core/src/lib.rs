//! shelf Core Library
//!
//! This crate provides the core functionality for shelf, a local catalog of
//! books and documents kept in a single file.
//!
//! # Architecture
//!
//! - **Catalog**: CRUD rules (required fields, unique titles, partial updates)
//! - **Storage**: whole-collection load/save, JSON or SQLite
//!
//! Every mutation rewrites the store atomically; there is no daemon and no
//! shared state between invocations.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut catalog = Catalog::open(&config);
//!
//! // Add a book
//! let mut book = NewRecord::new("Dune");
//! book.author = Some("Frank Herbert".into());
//! catalog.add(book)?;
//!
//! // Query books
//! let unread = catalog.filter(&Filter::new().status(Status::Unread))?;
//! ```
//!
//! # Modules
//!
//! - `catalog`: Catalog operations (main entry point)
//! - `models`: Record, its enumerations and the default policy
//! - `query`: Conjunctive filters, search and priority ordering
//! - `storage`: JSON and SQLite persistence, file archive
//! - `config`: Application configuration
//! - `error`: Catalog error kinds

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod storage;

pub use catalog::{Catalog, CatalogStats, UpdateOutcome};
pub use config::{Backend, Config};
pub use error::{CatalogError, CatalogResult};
pub use models::{normalize_title, Defaults, NewRecord, Priority, Record, RecordChanges, Status};
pub use query::{sort_by_priority, Filter};
pub use storage::{archive_file, JsonStore, RecordStore, SqliteStore, StorageError};
