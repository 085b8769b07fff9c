//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use shelf_core::Record;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print every field of a single record
    pub fn print_record(&self, record: &Record) {
        match self.format {
            OutputFormat::Human => print!("{}", record_detail(record)),
            OutputFormat::Json => println!("{}", to_json(record)),
            OutputFormat::Quiet => println!("{}", record.title),
        }
    }

    /// Print a list of records, one line each
    pub fn print_records(&self, records: &[Record]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No records found.");
                    return;
                }
                for record in records {
                    println!("{}", record_line(record));
                }
                println!("\n{} record(s)", records.len());
            }
            OutputFormat::Json => println!("{}", to_json(records)),
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.title);
                }
            }
        }
    }

    /// Print categories with their record counts
    pub fn print_categories(&self, categories: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                for (name, count) in categories {
                    println!("{} ({})", name, count);
                }
                println!("\n{} categories", categories.len());
            }
            OutputFormat::Json => {
                let json_categories: Vec<_> = categories
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                println!("{}", to_json(&json_categories));
            }
            OutputFormat::Quiet => {
                for (name, _) in categories {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning that does not fail the command
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "warning", "message": message})
                );
            }
            _ => eprintln!("Warning: {}", message),
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line summary used by listings
pub fn record_line(record: &Record) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        truncate(&record.title, 40),
        truncate(&record.author, 25),
        truncate(&record.category, 20),
        record.status,
        priority_label(record)
    )
}

/// Multi-line detail view
pub fn record_detail(record: &Record) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: &str| {
        out.push_str(&format!("{:<13}{}\n", format!("{}:", label), value));
    };

    line("Title", &record.title);
    line("Author", &record.author);
    line("Category", &record.category);
    line("Year", &record.published_year);
    line("Language", &record.language);
    line("Status", record.status.as_str());
    line("Priority", priority_label(record));
    if let Some(ref description) = record.description {
        line("Description", &truncate_line(description, 70));
    }
    if let Some(ref reason) = record.reason {
        line("Reason", &truncate_line(reason, 70));
    }
    if let Some(ref path) = record.path {
        line("File", &path.display().to_string());
    }
    if let Some(ref location) = record.location {
        line("Location", location);
    }
    line("ID", &record.id.to_string());
    line("Created", &record.created_at.format("%Y-%m-%d %H:%M").to_string());
    line("Updated", &record.updated_at.format("%Y-%m-%d %H:%M").to_string());
    out
}

fn priority_label(record: &Record) -> &'static str {
    record.priority.map(|p| p.as_str()).unwrap_or("unspecified")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()}).to_string())
}

/// Truncate a string to max length in characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
