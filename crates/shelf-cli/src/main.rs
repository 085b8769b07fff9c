//! shelf CLI
//!
//! Command-line interface for shelf - a local catalog of books and documents.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};

use shelf_core::{Catalog, CatalogError, Config, StorageError};

mod cli;
mod commands;
mod logging;
mod output;
mod prompt;

use cli::{CategoryCommands, Cli, Commands, ConfigCommands};
use output::{Output, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Config commands work on the config file itself
    if let Commands::Config { command } = command {
        return handle_config_command(command, cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config);

    let mut catalog = Catalog::open(&config);
    run(command, &mut catalog, &config, &output).map_err(with_recovery_hint)
}

/// Dispatch a catalog command
fn run(command: Commands, catalog: &mut Catalog, config: &Config, output: &Output) -> Result<()> {
    match command {
        Commands::Add(args) => commands::record::add(catalog, args, output),
        Commands::List(args) => commands::record::list(catalog, args, output),
        Commands::Search { term } => commands::record::search(catalog, term, output),
        Commands::Info { title } => commands::record::info(catalog, title, output),
        Commands::Update(args) => commands::record::update(catalog, args, output),
        Commands::Delete { title, yes } => commands::record::delete(catalog, title, yes, output),
        Commands::Open { title } => commands::record::open(catalog, config, title, output),
        Commands::Categories { command } => match command {
            Some(CategoryCommands::List) | None => commands::category::list(catalog, output),
            Some(CategoryCommands::Rename { old, new }) => {
                commands::category::rename(catalog, old, new, output)
            }
            Some(CategoryCommands::Delete { name }) => {
                commands::category::delete(catalog, name, output)
            }
        },
        Commands::Status => commands::status::show(catalog, output),
        Commands::Shell => commands::shell::run(catalog),
        Commands::Config { command } => handle_config_command(command, None, output),
    }
}

/// Append the storage layer's recovery suggestion, if any, to an error
fn with_recovery_hint(error: anyhow::Error) -> anyhow::Error {
    let storage = match error.downcast_ref::<CatalogError>() {
        Some(CatalogError::Storage(e)) => Some(e),
        _ => error.downcast_ref::<StorageError>(),
    };
    match storage.and_then(StorageError::recovery_suggestion) {
        Some(hint) => anyhow!("{:#}\nHint: {}", error, hint),
        None => error,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
