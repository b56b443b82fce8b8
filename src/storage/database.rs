//! `SQLite` database connection.
//!
//! The database lives at `~/.habitkit/habits.db` unless configured
//! otherwise. Opening it always brings the schema up to date.

use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};
use rusqlite::Connection;

use crate::config::Paths;
use crate::error::HabitError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the data directory cannot be created,
    /// the file cannot be opened, or migrations fail.
    pub fn open() -> Result<Self, HabitError> {
        let paths = Paths::new()?;
        paths
            .ensure_dirs()
            .map_err(|e| HabitError::StorageUnavailable(e.to_string()))?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened or
    /// migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, HabitError> {
        let started_at = Instant::now();
        info!("event=db_open module=storage status=start mode=file");

        let result = Connection::open(path)
            .map_err(|e| {
                HabitError::StorageUnavailable(format!(
                    "Failed to open database {}: {e}",
                    path.display()
                ))
            })
            .and_then(Self::bootstrap);

        log_open("file", started_at, &result);
        result
    }

    /// Open an in-memory database (tests and degraded sessions).
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened or
    /// migrations fail.
    pub fn open_in_memory() -> Result<Self, HabitError> {
        let started_at = Instant::now();
        info!("event=db_open module=storage status=start mode=memory");

        let result = Connection::open_in_memory()
            .map_err(|e| {
                HabitError::StorageUnavailable(format!("Failed to open in-memory database: {e}"))
            })
            .and_then(Self::bootstrap);

        log_open("memory", started_at, &result);
        result
    }

    fn bootstrap(conn: Connection) -> Result<Self, HabitError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| HabitError::StorageUnavailable(format!("Failed to enable foreign keys: {e}")))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| HabitError::StorageUnavailable(format!("Failed to set busy timeout: {e}")))?;

        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, HabitError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn log_open(mode: &str, started_at: Instant, result: &Result<Database, HabitError>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event=db_open module=storage status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=storage status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
}
