//! Status command handler

use anyhow::Result;

use shelf_core::Catalog;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(catalog: &Catalog, output: &Output) -> Result<()> {
    let store = catalog.store();
    let stats = catalog.stats()?;
    let size = std::fs::metadata(store.location())
        .map(|m| m.len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": store.backend().as_str(),
                    "location": store.location(),
                    "exists": store.exists(),
                    "size": size,
                    "counts": {
                        "total": stats.total,
                        "by_status": stats.by_status,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.total);
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", store.backend());
            println!("  Location: {}", store.location().display());
            if store.exists() {
                println!("  Size:     {}", human_size(size));
            } else {
                println!("  Size:     (not created yet)");
            }
            println!();
            println!("Contents:");
            println!("  Records: {}", stats.total);
            for (status, count) in &stats.by_status {
                println!("    {:<11} {}", format!("{}:", status), count);
            }
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 bytes");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
