//! Record command handlers

use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use shelf_core::{
    sort_by_priority, Catalog, CatalogError, CatalogResult, Config, Filter, NewRecord,
    RecordChanges, UpdateOutcome,
};

use crate::cli::{AddArgs, ListArgs, UpdateArgs};
use crate::output::{Output, OutputFormat};
use crate::prompt::{confirm, is_interactive};

/// Add a record
pub fn add(catalog: &mut Catalog, args: AddArgs, output: &Output) -> Result<()> {
    let archive = args.archive;
    let input = new_record(args)?;
    let record = if archive {
        catalog.add_archived(input)?
    } else {
        catalog.add(input)?
    };

    match output.format {
        OutputFormat::Human => output.success(&format!("Added '{}'", record.title)),
        _ => output.print_record(&record),
    }
    Ok(())
}

/// List records matching the given filters
pub fn list(catalog: &Catalog, args: ListArgs, output: &Output) -> Result<()> {
    let filter = Filter {
        author: args.author,
        category: args.category,
        status: parse_choice(args.status)?,
        priority: parse_choice(args.priority)?,
    };

    let mut records = catalog.filter(&filter)?;
    if args.sort_by_priority {
        sort_by_priority(&mut records);
    }

    output.print_records(&records);
    Ok(())
}

/// Search titles, authors and categories
pub fn search(catalog: &Catalog, term: String, output: &Output) -> Result<()> {
    let records = catalog.search(&term)?;
    output.print_records(&records);
    Ok(())
}

/// Show a single record
pub fn info(catalog: &Catalog, title: String, output: &Output) -> Result<()> {
    let record = catalog.get(&title)?;
    output.print_record(&record);
    Ok(())
}

/// Update fields of a record
pub fn update(catalog: &mut Catalog, args: UpdateArgs, output: &Output) -> Result<()> {
    let title = args.current_title.clone();
    let archive = args.archive;
    let changes = record_changes(args)?;

    let outcome = if archive {
        catalog.update_archived(&title, changes)?
    } else {
        catalog.update(&title, changes)?
    };
    match outcome {
        UpdateOutcome::Updated { record, changed } => match output.format {
            OutputFormat::Human => output.success(&format!(
                "Updated '{}' ({})",
                record.title,
                changed.join(", ")
            )),
            _ => output.print_record(&record),
        },
        UpdateOutcome::Unchanged(record) => {
            output.message(&format!("Nothing to update for '{}'", record.title));
        }
    }
    Ok(())
}

/// Delete a record
///
/// A missing title only produces a warning.
pub fn delete(catalog: &mut Catalog, title: String, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() && is_interactive() {
        let Some(record) = catalog.find_by_title(&title)? else {
            output.warn(&format!("No record titled '{}'", title));
            return Ok(());
        };
        if !confirm(&format!("Delete '{}'?", record.title))? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    match catalog.delete(&title) {
        Ok(record) => {
            output.success(&format!("Deleted '{}'", record.title));
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            output.warn(&format!("No record titled '{}'", title));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Open the file attached to a record
pub fn open(catalog: &Catalog, config: &Config, title: String, output: &Output) -> Result<()> {
    let record = catalog.get(&title)?;
    let Some(path) = record.path else {
        bail!("'{}' has no file attached", record.title);
    };
    if !path.exists() {
        return Err(CatalogError::MissingFile { path }.into());
    }

    launch_viewer(config.viewer.as_deref(), &path)?;
    output.success(&format!("Opened {}", path.display()));
    Ok(())
}

/// Run `viewer` on `path`, or the system opener when no viewer is configured
///
/// The viewer inherits stderr; a nonzero exit is an error.
pub fn launch_viewer(viewer: Option<&str>, path: &Path) -> Result<()> {
    match viewer.map(str::trim).filter(|v| !v.is_empty()) {
        Some(viewer) => {
            let mut parts = viewer.split_whitespace();
            let program = parts.next().unwrap_or(viewer);
            let status = Command::new(program)
                .args(parts)
                .arg(path)
                .status()
                .with_context(|| format!("Failed to run viewer: {}", viewer))?;
            if !status.success() {
                bail!("Viewer '{}' exited with {}", viewer, status);
            }
        }
        None => {
            open::that(path).with_context(|| format!("Failed to open {}", path.display()))?;
        }
    }
    Ok(())
}

/// Turn `add` arguments into catalog input
pub fn new_record(args: AddArgs) -> CatalogResult<NewRecord> {
    let path = args.file.as_deref().map(resolve_file).transpose()?;

    let title = args
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            path.as_ref()
                .and_then(|p| p.file_stem())
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .ok_or_else(|| CatalogError::missing_field("title"))?;

    Ok(NewRecord {
        title,
        author: args.author,
        category: args.category,
        published_year: args.year,
        language: args.language,
        status: parse_choice(args.status)?,
        priority: parse_choice(args.priority)?,
        description: args.description,
        reason: args.reason,
        path,
        location: args.location,
    })
}

/// Turn `update` arguments into a change set
pub fn record_changes(args: UpdateArgs) -> CatalogResult<RecordChanges> {
    Ok(RecordChanges {
        title: args.title,
        author: args.author,
        category: args.category,
        published_year: args.year,
        language: args.language,
        status: parse_choice(args.status)?,
        priority: parse_choice(args.priority)?,
        description: args.description,
        reason: args.reason,
        path: args.file.as_deref().map(resolve_file).transpose()?,
        location: args.location,
    })
}

/// Parse an optional enum argument, rejecting values outside the enumeration
pub fn parse_choice<T>(value: Option<String>) -> CatalogResult<Option<T>>
where
    T: FromStr<Err = CatalogError>,
{
    value.as_deref().map(str::parse).transpose()
}

/// Check that `path` is an existing file and make it absolute
pub fn resolve_file(path: &Path) -> CatalogResult<PathBuf> {
    if !path.is_file() {
        return Err(CatalogError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    path.canonicalize().map_err(|_| CatalogError::MissingFile {
        path: path.to_path_buf(),
    })
}
