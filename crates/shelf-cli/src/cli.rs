//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "shelf - Manage your book and document catalog from the terminal")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a record to the catalog
    Add(AddArgs),
    /// List records, optionally filtered
    #[command(alias = "ls")]
    List(ListArgs),
    /// Search titles, authors and categories
    Search {
        /// Text to look for (case-insensitive)
        term: String,
    },
    /// Show every field of a record
    #[command(alias = "show")]
    Info {
        /// Record title (case-insensitive)
        title: String,
    },
    /// Change fields of an existing record
    #[command(alias = "edit")]
    Update(UpdateArgs),
    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record title (case-insensitive)
        title: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a record's file with the configured viewer
    Open {
        /// Record title (case-insensitive)
        title: String,
    },
    /// List, rename or delete categories
    Categories {
        #[command(subcommand)]
        command: Option<CategoryCommands>,
    },
    /// Show store location and record counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Interactive menu
    Shell,
}

#[derive(Args, Debug, Default, Clone)]
pub struct AddArgs {
    /// Record title (defaults to the file name when --file is given)
    #[arg(short, long)]
    pub title: Option<String>,
    /// File the record points to (e.g. a PDF), must exist
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    #[arg(short, long)]
    pub author: Option<String>,
    /// Category or genre
    #[arg(short, long)]
    pub category: Option<String>,
    /// Publication year
    #[arg(short, long)]
    pub year: Option<String>,
    #[arg(short, long)]
    pub language: Option<String>,
    /// unread, reading, read, registered or archived
    #[arg(short, long)]
    pub status: Option<String>,
    /// high, medium or low
    #[arg(short, long)]
    pub priority: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Why this record is in the catalog
    #[arg(short, long)]
    pub reason: Option<String>,
    /// Physical location of a paper document
    #[arg(long)]
    pub location: Option<String>,
    /// Copy the file into the category's archive folder and store the copy
    #[arg(long, requires = "file")]
    pub archive: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[arg(short, long)]
    pub author: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub status: Option<String>,
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Order high → medium → low
    #[arg(long)]
    pub sort_by_priority: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct UpdateArgs {
    /// Current title of the record (case-insensitive)
    pub current_title: String,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New file path, must exist
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    #[arg(short, long)]
    pub author: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub year: Option<String>,
    #[arg(short, long)]
    pub language: Option<String>,
    #[arg(short, long)]
    pub status: Option<String>,
    #[arg(short, long)]
    pub priority: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub reason: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Copy the record's file into its category's archive folder
    #[arg(long)]
    pub archive: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommands {
    /// List categories with record counts
    #[command(alias = "ls")]
    List,
    /// Rename a category on every record that uses it
    Rename {
        /// Current category name (case-insensitive)
        old: String,
        /// New category name
        new: String,
    },
    /// Move a category's records to the default category
    #[command(alias = "rm")]
    Delete {
        /// Category name (case-insensitive)
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, store_path, viewer, log_file, defaults.<field>)
        key: String,
        /// Configuration value
        value: String,
    },
}
