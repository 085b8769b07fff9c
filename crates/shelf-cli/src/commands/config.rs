//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::{Config, Priority, Status};

use crate::commands::record::parse_choice;
use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "data_dir, backend, store_path, viewer, log_file, \
                          defaults.author, defaults.category, defaults.published_year, \
                          defaults.language, defaults.status, defaults.priority";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.as_str(),
                    "store_path": config.store_path(),
                    "viewer": config.viewer,
                    "log_file": config.log_file,
                    "defaults": config.defaults,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.store_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            let defaults = &config.defaults;
            println!("Configuration:");
            println!("  data_dir:   {}", config.data_dir.display());
            println!("  backend:    {}", config.backend);
            println!("  store_path: {}", config.store_path().display());
            println!(
                "  viewer:     {}",
                config.viewer.as_deref().unwrap_or("(system default)")
            );
            println!(
                "  log_file:   {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Defaults for new records:");
            println!("  author:         {}", defaults.author);
            println!("  category:       {}", defaults.category);
            println!("  published_year: {}", defaults.published_year);
            println!("  language:       {}", defaults.language);
            println!("  status:         {}", defaults.status);
            println!("  priority:       {}", defaults.priority);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    // SHELF_* overrides stay out of the file
    let mut config = Config::load_file_only(&save_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply one `key = value` pair to `config`
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "data_dir" => config.data_dir = value.into(),
        "backend" => config.backend = value.parse()?,
        "store_path" => config.store_path = (!unset).then(|| value.into()),
        "viewer" => config.viewer = (!unset).then(|| value.to_string()),
        "log_file" => config.log_file = (!unset).then(|| value.into()),
        "defaults.author" => config.defaults.author = required(key, value)?,
        "defaults.category" => config.defaults.category = required(key, value)?,
        "defaults.published_year" => config.defaults.published_year = required(key, value)?,
        "defaults.language" => config.defaults.language = required(key, value)?,
        "defaults.status" => {
            config.defaults.status = parse_choice::<Status>(Some(value.to_string()))?
                .with_context(|| format!("{} needs a value", key))?;
        }
        "defaults.priority" => {
            config.defaults.priority = parse_choice::<Priority>(Some(value.to_string()))?
                .with_context(|| format!("{} needs a value", key))?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

fn required(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} cannot be empty", key);
    }
    Ok(value.to_string())
}
