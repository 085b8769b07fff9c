//! Interactive menu
//!
//! A read-eval loop over a numbered menu. Each pass waits for a selection,
//! runs the chosen operation and returns to the menu. It ends on `0`, `q`,
//! `exit` or end of input; operation errors are reported and the loop goes on.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;

use shelf_core::{Catalog, NewRecord, Record, RecordChanges, UpdateOutcome};

use crate::commands::record::{parse_choice, resolve_file};
use crate::output::{record_detail, record_line};
use crate::prompt::{confirm_with, read_answer};

/// Menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    List,
    Search,
    Show,
    Update,
    Delete,
    Categories,
    RenameCategory,
    DeleteCategory,
    Exit,
}

impl MenuChoice {
    const MENU: [(&'static str, &'static str); 10] = [
        ("1", "Add record"),
        ("2", "List records"),
        ("3", "Search records"),
        ("4", "Show record"),
        ("5", "Update record"),
        ("6", "Delete record"),
        ("7", "Categories"),
        ("8", "Rename category"),
        ("9", "Delete category"),
        ("0", "Exit"),
    ];

    /// Parse a menu selection
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "add" => Some(MenuChoice::Add),
            "2" | "list" | "ls" => Some(MenuChoice::List),
            "3" | "search" => Some(MenuChoice::Search),
            "4" | "show" | "info" => Some(MenuChoice::Show),
            "5" | "update" | "edit" => Some(MenuChoice::Update),
            "6" | "delete" | "rm" => Some(MenuChoice::Delete),
            "7" | "categories" => Some(MenuChoice::Categories),
            "8" | "rename-category" => Some(MenuChoice::RenameCategory),
            "9" | "delete-category" => Some(MenuChoice::DeleteCategory),
            "0" | "q" | "quit" | "exit" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Run the menu on the process's stdin and stdout
pub fn run(catalog: &mut Catalog) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(catalog, stdin.lock(), stdout.lock()).run()
}

/// Menu loop over arbitrary input and output streams
pub struct Shell<'a, R, W> {
    catalog: &'a mut Catalog,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(catalog: &'a mut Catalog, input: R, out: W) -> Self {
        Self {
            catalog,
            input,
            out,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = read_answer(&mut self.input)? else {
                writeln!(self.out)?;
                break;
            };
            if line.is_empty() {
                continue;
            }

            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.out, "Unknown option '{}'", line)?;
                continue;
            };
            if choice == MenuChoice::Exit {
                break;
            }

            if let Err(e) = self.execute(choice) {
                writeln!(self.out, "Error: {:#}", e)?;
            }
            writeln!(self.out)?;
        }

        writeln!(self.out, "Bye.")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "=== shelf ===")?;
        for (key, label) in MenuChoice::MENU {
            writeln!(self.out, "{}) {}", key, label)?;
        }
        Ok(())
    }

    fn execute(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::Add => self.add(),
            MenuChoice::List => {
                let records = self.catalog.all()?;
                self.print_records(&records)
            }
            MenuChoice::Search => {
                let term = self.field("Search for")?;
                let records = self.catalog.search(&term)?;
                self.print_records(&records)
            }
            MenuChoice::Show => {
                let title = self.field("Title")?;
                let record = self.catalog.get(&title)?;
                write!(self.out, "{}", record_detail(&record))?;
                Ok(())
            }
            MenuChoice::Update => self.update(),
            MenuChoice::Delete => self.delete(),
            MenuChoice::Categories => {
                let categories = self.catalog.categories()?;
                if categories.is_empty() {
                    writeln!(self.out, "No categories found.")?;
                }
                for (name, count) in categories {
                    writeln!(self.out, "{} ({})", name, count)?;
                }
                Ok(())
            }
            MenuChoice::RenameCategory => {
                let old = self.field("Category")?;
                let new = self.field("New name")?;
                match self.catalog.rename_category(&old, &new)? {
                    0 => writeln!(self.out, "No records in category '{}'", old)?,
                    moved => writeln!(self.out, "Renamed '{}' ({} record(s))", old, moved)?,
                }
                Ok(())
            }
            MenuChoice::DeleteCategory => self.delete_category(),
            MenuChoice::Exit => Ok(()),
        }
    }

    fn add(&mut self) -> Result<()> {
        let title = self.field("Title")?;
        if title.is_empty() {
            writeln!(self.out, "A title is required.")?;
            return Ok(());
        }

        let author = self.optional("Author")?;
        let category = self.optional("Category")?;
        let published_year = self.optional("Year")?;
        let language = self.optional("Language")?;
        let status = parse_choice(self.optional("Status (unread/reading/read/registered/archived)")?)?;
        let priority = parse_choice(self.optional("Priority (high/medium/low)")?)?;
        let description = self.optional("Description")?;
        let reason = self.optional("Reason")?;
        let location = self.optional("Location")?;
        let path = self
            .optional("File")?
            .map(|p| resolve_file(Path::new(&p)))
            .transpose()?;

        let record = self.catalog.add(NewRecord {
            title,
            author,
            category,
            published_year,
            language,
            status,
            priority,
            description,
            reason,
            path,
            location,
        })?;
        writeln!(self.out, "Added '{}'", record.title)?;
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        let title = self.field("Title")?;
        let current = self.catalog.get(&title)?;
        writeln!(self.out, "Press Enter to keep the current value.")?;

        let priority = current.priority.map(|p| p.as_str()).unwrap_or("");
        let changes = RecordChanges {
            title: self.keep("Title", &current.title)?,
            author: self.keep("Author", &current.author)?,
            category: self.keep("Category", &current.category)?,
            published_year: self.keep("Year", &current.published_year)?,
            language: self.keep("Language", &current.language)?,
            status: parse_choice(self.keep("Status", current.status.as_str())?)?,
            priority: parse_choice(self.keep("Priority", priority)?)?,
            description: self.keep("Description", current.description.as_deref().unwrap_or(""))?,
            reason: self.keep("Reason", current.reason.as_deref().unwrap_or(""))?,
            location: self.keep("Location", current.location.as_deref().unwrap_or(""))?,
            path: None,
        };

        match self.catalog.update(&current.title, changes)? {
            UpdateOutcome::Updated { record, changed } => {
                writeln!(self.out, "Updated '{}' ({})", record.title, changed.join(", "))?;
            }
            UpdateOutcome::Unchanged(record) => {
                writeln!(self.out, "Nothing to update for '{}'", record.title)?;
            }
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let title = self.field("Title")?;
        let Some(record) = self.catalog.find_by_title(&title)? else {
            writeln!(self.out, "No record titled '{}'", title)?;
            return Ok(());
        };

        let prompt = format!("Delete '{}'?", record.title);
        if !confirm_with(&mut self.input, &mut self.out, &prompt)? {
            writeln!(self.out, "Cancelled.")?;
            return Ok(());
        }

        self.catalog.delete(&record.title)?;
        writeln!(self.out, "Deleted '{}'", record.title)?;
        Ok(())
    }

    fn delete_category(&mut self) -> Result<()> {
        let name = self.field("Category")?;
        let fallback = self.catalog.defaults().category.clone();
        let prompt = format!("Move records in '{}' to '{}'?", name, fallback);
        if !confirm_with(&mut self.input, &mut self.out, &prompt)? {
            writeln!(self.out, "Cancelled.")?;
            return Ok(());
        }

        match self.catalog.delete_category(&name)? {
            0 => writeln!(self.out, "No records in category '{}'", name)?,
            moved => writeln!(self.out, "Deleted '{}' ({} record(s) moved)", name, moved)?,
        }
        Ok(())
    }

    fn print_records(&mut self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            writeln!(self.out, "No records found.")?;
            return Ok(());
        }
        for record in records {
            writeln!(self.out, "{}", record_line(record))?;
        }
        writeln!(self.out, "{} record(s)", records.len())?;
        Ok(())
    }

    /// Ask for a value; end of input reads as empty
    fn field(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{}: ", label)?;
        self.out.flush()?;
        Ok(read_answer(&mut self.input)?.unwrap_or_default())
    }

    fn optional(&mut self, label: &str) -> Result<Option<String>> {
        let value = self.field(label)?;
        Ok((!value.is_empty()).then_some(value))
    }

    /// Ask for a replacement value, showing the current one
    fn keep(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        self.optional(&format!("{} [{}]", label, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{Defaults, JsonStore, Priority, Status};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn catalog(dir: &TempDir) -> Catalog {
        let store = JsonStore::new(dir.path().join("catalog.json"));
        Catalog::with_store(Box::new(store), Defaults::default())
    }

    fn run_script(catalog: &mut Catalog, script: &str) -> String {
        let mut out = Vec::new();
        Shell::new(catalog, Cursor::new(script.to_string()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Add));
        assert_eq!(MenuChoice::parse(" LS "), Some(MenuChoice::List));
        assert_eq!(MenuChoice::parse("q"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("exit"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("8"), Some(MenuChoice::RenameCategory));
        assert_eq!(MenuChoice::parse("42"), None);
    }

    #[test]
    fn test_exit_and_end_of_input() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);

        let output = run_script(&mut catalog, "0\n");
        assert!(output.contains("=== shelf ==="));
        assert!(output.ends_with("Bye.\n"));

        let output = run_script(&mut catalog, "");
        assert!(output.ends_with("Bye.\n"));
    }

    #[test]
    fn test_unknown_option_returns_to_menu() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);

        let output = run_script(&mut catalog, "42\nq\n");
        assert!(output.contains("Unknown option '42'"));
        assert_eq!(output.matches("=== shelf ===").count(), 2);
    }

    #[test]
    fn test_add_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);

        // title, author, category, year, language, status, priority,
        // description, reason, location, file
        let script = "1\nDune\nFrank Herbert\n\n\n\n\nhigh\n\n\n\n\n2\n0\n";
        let output = run_script(&mut catalog, script);

        assert!(output.contains("Added 'Dune'"));
        assert!(output.contains("Dune | Frank Herbert | General | unread | high"));

        let record = catalog.get("dune").unwrap();
        assert_eq!(record.priority, Some(Priority::High));
        assert_eq!(record.language, "en");
    }

    #[test]
    fn test_errors_keep_the_loop_running() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(NewRecord::new("Dune")).unwrap();

        let script = "1\ndune\n\n\n\n\n\n\n\n\n\n\n4\nNope\n0\n";
        let output = run_script(&mut catalog, script);

        assert!(output.contains("Error: A record titled 'Dune' already exists"));
        assert!(output.contains("Error: No record found with title 'Nope'"));
        assert!(output.ends_with("Bye.\n"));
        assert_eq!(catalog.all().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_status_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);

        let script = "1\nDune\n\n\n\n\nfinished\n\n\n\n\n\n0\n";
        let output = run_script(&mut catalog, script);

        assert!(output.contains("Error: Invalid status"));
        assert!(catalog.all().unwrap().is_empty());
    }

    #[test]
    fn test_update_keeps_blank_fields() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(NewRecord::new("Dune")).unwrap();

        // title lookup, then title, author, category, year, language,
        // status, priority, description, reason, location
        let script = "5\nDune\n\n\n\n\n\nread\n\n\n\n\n0\n";
        let output = run_script(&mut catalog, script);

        assert!(output.contains("Updated 'Dune' (status)"));
        let record = catalog.get("Dune").unwrap();
        assert_eq!(record.status, Status::Read);
        assert_eq!(record.author, "Unknown Author");
    }

    #[test]
    fn test_update_without_changes() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(NewRecord::new("Dune")).unwrap();

        let script = "5\nDune\n\n\n\n\n\n\n\n\n\n\n0\n";
        let output = run_script(&mut catalog, script);
        assert!(output.contains("Nothing to update for 'Dune'"));
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(NewRecord::new("Dune")).unwrap();

        let output = run_script(&mut catalog, "6\nDune\nn\n0\n");
        assert!(output.contains("Cancelled."));
        assert_eq!(catalog.all().unwrap().len(), 1);

        let output = run_script(&mut catalog, "6\ndune\ny\n0\n");
        assert!(output.contains("Deleted 'Dune'"));
        assert!(catalog.all().unwrap().is_empty());
    }

    #[test]
    fn test_categories() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);

        let output = run_script(&mut catalog, "7\n0\n");
        assert!(output.contains("No categories found."));

        catalog.add(NewRecord::new("Dune")).unwrap();
        let output = run_script(&mut catalog, "7\n0\n");
        assert!(output.contains("General (1)"));
    }

    fn filed(title: &str, category: &str) -> NewRecord {
        let mut input = NewRecord::new(title);
        input.category = Some(category.to_string());
        input
    }

    #[test]
    fn test_rename_category() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();
        catalog.add(filed("Receipt", "Taxes")).unwrap();

        let output = run_script(&mut catalog, "8\ntaxes\nImpuestos\n0\n");
        assert!(output.contains("Renamed 'taxes' (2 record(s))"));
        assert_eq!(
            catalog.categories().unwrap(),
            vec![("Impuestos".to_string(), 2)]
        );

        let output = run_script(&mut catalog, "8\nPoetry\nVerse\n0\n");
        assert!(output.contains("No records in category 'Poetry'"));
    }

    #[test]
    fn test_rename_category_to_blank_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();

        let output = run_script(&mut catalog, "8\nTaxes\n\n0\n");
        assert!(output.contains("Error: Invalid category"));
        assert_eq!(catalog.get("Invoice").unwrap().category, "Taxes");
    }

    #[test]
    fn test_delete_category_asks_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();

        let output = run_script(&mut catalog, "9\nTaxes\nn\n0\n");
        assert!(output.contains("Cancelled."));
        assert_eq!(catalog.get("Invoice").unwrap().category, "Taxes");

        let output = run_script(&mut catalog, "9\nTaxes\ny\n0\n");
        assert!(output.contains("Deleted 'Taxes' (1 record(s) moved)"));
        assert_eq!(catalog.get("Invoice").unwrap().category, "General");
    }
}
