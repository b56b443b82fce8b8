//! Async facade over [`HabitStore`].
//!
//! Operations queue on a `tokio::sync::Mutex` (FIFO) and the `SQLite` work
//! runs on the blocking pool, so awaiting a store call never stalls the
//! async runtime. There is no cancellation: dropping the future after the
//! blocking task started still lets that task finish.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::HabitStore;
use crate::core::CalendarDay;
use crate::error::HabitError;
use crate::habits::{Habit, HabitId, NewHabit};

#[derive(Debug, Clone, Copy)]
enum Access {
    Read,
    Write,
}

impl Access {
    fn join_error(self, err: &tokio::task::JoinError) -> HabitError {
        let message = format!("Task join error: {err}");
        match self {
            Self::Read => HabitError::StorageRead(message),
            Self::Write => HabitError::StorageWrite(message),
        }
    }
}

/// Shared, cloneable handle to a habit store.
#[derive(Clone)]
pub struct AsyncHabitStore {
    inner: Arc<Mutex<HabitStore>>,
}

impl AsyncHabitStore {
    /// Wrap an already opened store.
    #[must_use]
    pub fn new(store: HabitStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Open (or create) the store at `path` on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened.
    pub async fn init(path: PathBuf) -> Result<Self, HabitError> {
        let store = tokio::task::spawn_blocking(move || HabitStore::init(&path))
            .await
            .map_err(|e| HabitError::StorageUnavailable(format!("Task join error: {e}")))??;
        Ok(Self::new(store))
    }

    /// See [`HabitStore::get_all`].
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` on failure.
    pub async fn get_all(&self) -> Result<Vec<Habit>, HabitError> {
        self.run(Access::Read, HabitStore::get_all).await
    }

    /// See [`HabitStore::get`].
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` on failure.
    pub async fn get(&self, id: HabitId) -> Result<Option<Habit>, HabitError> {
        self.run(Access::Read, move |store| store.get(id)).await
    }

    /// See [`HabitStore::add`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidHabit` or `StorageWrite`.
    pub async fn add(&self, habit: NewHabit) -> Result<HabitId, HabitError> {
        self.run(Access::Write, move |store| store.add(&habit)).await
    }

    /// See [`HabitStore::update`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidHabit` or `StorageWrite`.
    pub async fn update(&self, habit: Habit) -> Result<(), HabitError> {
        self.run(Access::Write, move |store| store.update(&habit)).await
    }

    /// See [`HabitStore::delete`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `StorageWrite`.
    pub async fn delete(&self, id: HabitId) -> Result<(), HabitError> {
        self.run(Access::Write, move |store| store.delete(id)).await
    }

    /// See [`HabitStore::toggle_day`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `StorageWrite`.
    pub async fn toggle_day(&self, id: HabitId, day: CalendarDay) -> Result<Habit, HabitError> {
        self.run(Access::Write, move |store| store.toggle_day(id, day))
            .await
    }

    async fn run<T, F>(&self, access: Access, op: F) -> Result<T, HabitError>
    where
        T: Send + 'static,
        F: FnOnce(&HabitStore) -> Result<T, HabitError> + Send + 'static,
    {
        // The owned guard travels into the blocking task, so the store stays
        // locked until the SQLite call returns.
        let guard = Arc::clone(&self.inner).lock_owned().await;

        tokio::task::spawn_blocking(move || op(&*guard))
            .await
            .map_err(|e| access.join_error(&e))?
    }
}
