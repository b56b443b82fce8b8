//! Error types for habitkit.

use thiserror::Error;

use crate::habits::HabitId;

/// Errors returned by the habit store and the supporting layers.
///
/// Statistics functions never produce errors; everything here comes from
/// storage, configuration or logging setup.
#[derive(Debug, Error)]
pub enum HabitError {
    /// The storage backend cannot be opened or migrated.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A read failed or returned corrupt data.
    #[error("Storage read failed: {0}")]
    StorageRead(String),

    /// A write failed.
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// No habit with the given id exists.
    #[error("Habit not found: {0}")]
    NotFound(HabitId),

    /// The habit record is malformed (e.g. empty name).
    #[error("Invalid habit: {0}")]
    InvalidHabit(String),

    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HabitError {
    /// Whether retrying the same operation may succeed.
    ///
    /// Only per-operation read/write failures qualify. A `NotFound` targets a
    /// stale id and will keep failing.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageRead(_) | Self::StorageWrite(_))
    }
}
