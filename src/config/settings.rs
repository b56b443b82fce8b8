//! Configuration settings for habitkit.
//!
//! Settings are loaded from `~/.habitkit/config.yaml`. Every field has a
//! default, so a partial file only overrides what it names.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::error::HabitError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Habit store settings.
    pub storage: StorageConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Habit store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; `~/.habitkit/habits.db` when unset.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Keep running on an in-memory store when the file cannot be opened.
    #[serde(default = "default_true")]
    pub fallback_to_memory: bool,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log directory; `~/.habitkit/logs/` when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: None,
            fallback_to_memory: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl StorageConfig {
    /// The database file to open.
    #[must_use]
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        self.database.clone().unwrap_or_else(|| paths.database.clone())
    }
}

impl LoggingConfig {
    /// The directory log files are written to.
    #[must_use]
    pub fn log_dir(&self, paths: &Paths) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| paths.logs.clone())
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, HabitError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, HabitError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            HabitError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            HabitError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<(), HabitError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.config_file)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), HabitError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| HabitError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            HabitError::Config(format!("Failed to write config file {}: {e}", path.display()))
        })
    }
}
