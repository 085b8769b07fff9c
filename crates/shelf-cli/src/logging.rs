//! Diagnostic logging
//!
//! Off unless SHELF_LOG is set. Its value is the level for the library and the binary
//! (`debug`, `info`, ...). Lines go to `log_file` when configured,
//! stderr otherwise.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::Config;

const LOG_ENV: &str = "SHELF_LOG";

/// Initialize logging from SHELF_LOG and the configured log file
pub fn init(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let env_filter = EnvFilter::new(filter_directive(&log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false);

    // Ignore the error if a subscriber is already installed
    match config.log_file.as_deref() {
        Some(path) => {
            let log_file = match open_log_file(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };
            let _ = builder.with_writer(Mutex::new(log_file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    info!("Logging initialized at level {}", log_level);
}

fn filter_directive(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        other => other,
    };
    format!("shelf_core={level},{}={level}", env!("CARGO_CRATE_NAME"))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
