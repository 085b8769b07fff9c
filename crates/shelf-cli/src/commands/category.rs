//! Category command handlers

use anyhow::Result;

use shelf_core::Catalog;

use crate::output::Output;

/// List categories with record counts
pub fn list(catalog: &Catalog, output: &Output) -> Result<()> {
    let categories = catalog.categories()?;
    output.print_categories(&categories);
    Ok(())
}

/// Rename a category across every record that uses it
pub fn rename(catalog: &mut Catalog, old: String, new: String, output: &Output) -> Result<()> {
    match catalog.rename_category(&old, &new)? {
        0 => output.warn(&format!("No records in category '{}'", old)),
        moved => output.success(&format!(
            "Renamed '{}' to '{}' ({} record(s))",
            old,
            new.trim(),
            moved
        )),
    }
    Ok(())
}

/// Remove a category by moving its records to the default category
pub fn delete(catalog: &mut Catalog, name: String, output: &Output) -> Result<()> {
    let fallback = catalog.defaults().category.clone();
    match catalog.delete_category(&name)? {
        0 => output.warn(&format!("No records in category '{}'", name)),
        moved => output.success(&format!(
            "Deleted '{}'; {} record(s) moved to '{}'",
            name, moved, fallback
        )),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use shelf_core::{Defaults, JsonStore, NewRecord};
    use tempfile::TempDir;

    fn catalog(dir: &TempDir) -> Catalog {
        let store = JsonStore::new(dir.path().join("catalog.json"));
        Catalog::with_store(Box::new(store), Defaults::default())
    }

    fn filed(title: &str, category: &str) -> NewRecord {
        let mut input = NewRecord::new(title);
        input.category = Some(category.to_string());
        input
    }

    #[test]
    fn test_rename() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        rename(&mut catalog, "taxes".to_string(), "Impuestos".to_string(), &output).unwrap();
        assert_eq!(catalog.get("Invoice").unwrap().category, "Impuestos");
    }

    #[test]
    fn test_rename_unknown_category_is_soft() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);

        rename(&mut catalog, "Taxes".to_string(), "Impuestos".to_string(), &output).unwrap();
        assert!(!catalog.store().exists());
    }

    #[test]
    fn test_rename_to_blank_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        assert!(rename(&mut catalog, "Taxes".to_string(), " ".to_string(), &output).is_err());
    }

    #[test]
    fn test_delete_moves_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = catalog(&temp_dir);
        catalog.add(filed("Invoice", "Taxes")).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        delete(&mut catalog, "Taxes".to_string(), &output).unwrap();
        assert_eq!(
            catalog.categories().unwrap(),
            vec![("General".to_string(), 1)]
        );
    }
}
