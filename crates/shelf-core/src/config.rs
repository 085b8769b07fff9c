//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/shelf/config.toml)
//! 3. Environment variables (SHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Defaults;

/// Environment variable prefix
const ENV_PREFIX: &str = "SHELF";

/// Which file format backs the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Single JSON array file
    #[default]
    Json,
    /// SQLite database with categories and records tables
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
        }
    }

    /// File name used inside `data_dir` when no explicit store path is set
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Backend::Json => "catalog.json",
            Backend::Sqlite => "catalog.db",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" | "sqlite3" | "db" => Ok(Backend::Sqlite),
            other => bail!("Unknown backend '{}'. Use 'json' or 'sqlite'.", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the catalog store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Store backend
    #[serde(default)]
    pub backend: Backend,

    /// Explicit store file, overriding `data_dir`
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Program used by `open` (falls back to the system opener)
    #[serde(default)]
    pub viewer: Option<String>,

    /// Log file used when SHELF_LOG is set (stderr otherwise)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Values for fields left out when adding a record
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            store_path: None,
            viewer: None,
            log_file: None,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHELF_DATA_DIR, SHELF_BACKEND, SHELF_STORE, SHELF_VIEWER)
    /// 2. Config file (~/.config/shelf/config.toml or SHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, using `path` instead of the default file if given
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file_only(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load only what the file says, without environment overrides
    ///
    /// Used when the config is going to be written back, so values that
    /// came from SHELF_* variables are not persisted.
    pub fn load_file_only(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // SHELF_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // SHELF_BACKEND
        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            self.backend = val
                .parse()
                .with_context(|| format!("Invalid {}_BACKEND", ENV_PREFIX))?;
        }

        // SHELF_STORE
        if let Ok(val) = std::env::var(format!("{}_STORE", ENV_PREFIX)) {
            self.store_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // SHELF_VIEWER
        if let Ok(val) = std::env::var(format!("{}_VIEWER", ENV_PREFIX)) {
            self.viewer = if val.is_empty() { None } else { Some(val) };
        }

        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelf")
            .join("config.toml")
    }

    /// Get the path of the catalog store
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(self.backend.default_file_name()))
    }

    /// Directory that `--archive` copies files into, one subdirectory per category
    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status};
    use std::env;
    use std::sync::Mutex;

    // Serializes every test that reads or writes SHELF_* variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "SHELF_DATA_DIR",
        "SHELF_BACKEND",
        "SHELF_STORE",
        "SHELF_VIEWER",
        "SHELF_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Json);
        assert!(config.store_path.is_none());
        assert!(config.viewer.is_none());
        assert!(config.data_dir.ends_with("shelf"));
        assert_eq!(config.defaults, Defaults::default());
    }

    #[test]
    fn test_store_path() {
        let mut config = Config {
            data_dir: PathBuf::from("/data/shelf"),
            ..Config::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/data/shelf/catalog.json"));

        config.backend = Backend::Sqlite;
        assert_eq!(config.store_path(), PathBuf::from("/data/shelf/catalog.db"));

        config.store_path = Some(PathBuf::from("/elsewhere/books.json"));
        assert_eq!(config.store_path(), PathBuf::from("/elsewhere/books.json"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("json".parse::<Backend>().unwrap(), Backend::Json);
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert!("yaml".parse::<Backend>().is_err());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("SHELF_DATA_DIR", "/tmp/shelf-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shelf-test"));
    }

    #[test]
    fn test_env_override_backend_and_store() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("SHELF_BACKEND", "sqlite");
        env::set_var("SHELF_STORE", "/tmp/books.db");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.store_path(), PathBuf::from("/tmp/books.db"));

        // Empty string clears the explicit store
        env::set_var("SHELF_STORE", "");
        config.apply_env_overrides().unwrap();
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_env_override_invalid_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHELF_BACKEND", "csv");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/shelf"),
            backend: Backend::Sqlite,
            store_path: None,
            viewer: Some("zathura".to_string()),
            log_file: None,
            defaults: Defaults::default(),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("backend = \"sqlite\""));
        assert!(toml_str.contains("[defaults]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.viewer, config.viewer);
    }

    #[test]
    fn test_load_from_str_with_defaults_table() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            viewer = "zathura"

            [defaults]
            author = "Joe Doe"
            category = "Programming"
            priority = "medium"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.viewer.as_deref(), Some("zathura"));
        assert_eq!(config.defaults.author, "Joe Doe");
        assert_eq!(config.defaults.category, "Programming");
        assert_eq!(config.defaults.priority, Priority::Medium);
        // Unspecified defaults keep their built-in values
        assert_eq!(config.defaults.status, Status::Unread);
        assert_eq!(config.defaults.language, "en");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.backend, Backend::Json);
        assert!(config.viewer.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend = Backend::Sqlite;
        config.defaults.category = "Trabajo".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.backend, Backend::Sqlite);
        assert_eq!(loaded.defaults.category, "Trabajo");
    }

    #[test]
    fn test_load_file_only_ignores_env() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "viewer = \"zathura\"\n").unwrap();

        env::set_var("SHELF_VIEWER", "evince");
        env::set_var("SHELF_STORE", "/tmp/env-only.db");

        let from_file = Config::load_file_only(&path).unwrap();
        assert_eq!(from_file.viewer.as_deref(), Some("zathura"));
        assert!(from_file.store_path.is_none());

        let effective = Config::load_from_path(&path).unwrap();
        assert_eq!(effective.viewer.as_deref(), Some("evince"));
        assert_eq!(effective.store_path(), PathBuf::from("/tmp/env-only.db"));
    }

    #[test]
    fn test_archive_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data/shelf"),
            ..Config::default()
        };
        assert_eq!(config.archive_dir(), PathBuf::from("/data/shelf/files"));
    }

    #[test]
    fn test_config_file_path_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("SHELF_CONFIG", "/tmp/custom-shelf.toml");
        assert_eq!(
            Config::config_file_path(),
            PathBuf::from("/tmp/custom-shelf.toml")
        );
    }
}
