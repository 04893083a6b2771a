//! Persistence unit configuration.
//!
//! # Responsibility
//! - Describe named persistence units (data source plus options).
//! - Load unit definitions from JSON, falling back to the built-in default.
//!
//! # Invariants
//! - Unit names are non-empty and unique within one configuration.
//! - The built-in default always defines `DEFAULT_UNIT_NAME`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Unit used by the command-line routine.
pub const DEFAULT_UNIT_NAME: &str = "hello";
/// Environment variable pointing at a configuration file.
pub const CONFIG_PATH_ENV: &str = "JPASHOP_PERSISTENCE";
/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "persistence.json";
const DEFAULT_DB_FILE: &str = "jpashop.db";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid persistence configuration: {err}"),
            Self::Invalid(message) => write!(f, "invalid persistence configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Where a unit keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// SQLite database file, created on first use.
    File { path: PathBuf },
    /// Process-local database that lives as long as its factory.
    Memory,
}

/// One named persistence unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceUnit {
    pub name: String,
    pub data_source: DataSource,
    /// Logs every executed SQL statement at `info` level.
    #[serde(default)]
    pub show_sql: bool,
}

impl PersistenceUnit {
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source: DataSource::Memory,
            show_sql: false,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data_source: DataSource::File { path: path.into() },
            show_sql: false,
        }
    }
}

/// Set of persistence units available to the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub units: Vec<PersistenceUnit>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            units: vec![PersistenceUnit::file(DEFAULT_UNIT_NAME, DEFAULT_DB_FILE)],
        }
    }
}

impl PersistenceConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolves configuration for the current process.
    ///
    /// Order: the file named by `JPASHOP_PERSISTENCE`, then
    /// `persistence.json` in the working directory, then the built-in default.
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::load(PathBuf::from(path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    /// Looks up a unit by exact name.
    pub fn unit(&self, name: &str) -> Option<&PersistenceUnit> {
        self.units.iter().find(|unit| unit.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for unit in &self.units {
            let name = unit.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid("unit name cannot be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Invalid(format!("duplicate unit name `{name}`")));
            }
            if let DataSource::File { path } = &unit.data_source {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "unit `{name}` has an empty file path"
                    )));
                }
            }
        }
        Ok(())
    }
}
