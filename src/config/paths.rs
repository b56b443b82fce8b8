//! Path resolution for habitkit configuration and data files.
//!
//! All habitkit data is stored in `~/.habitkit/`:
//! - `config.yaml` - Main configuration file
//! - `habits.db` - SQLite habit store
//! - `logs/` - Rotating log files

use std::path::PathBuf;

use crate::error::HabitError;

/// Paths to habitkit configuration and data directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.habitkit/`
    pub root: PathBuf,
    /// Config file: `~/.habitkit/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.habitkit/habits.db`
    pub database: PathBuf,
    /// Log directory: `~/.habitkit/logs/`
    pub logs: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, HabitError> {
        let home = std::env::var("HOME")
            .map_err(|_| HabitError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(".habitkit")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("habits.db"),
            logs: root.join("logs"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), HabitError> {
        for dir in [&self.root, &self.logs] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    HabitError::Config(format!("Failed to create directory {}: {e}", dir.display()))
                })?;
            }
        }

        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".habitkit")))
    }
}
