//! Habit persistence.
//!
//! Every public operation touches a single habit and runs in its own
//! transaction. Reads build fresh `Habit` values; callers own the snapshot
//! and must reload after any mutation.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};

use super::Database;
use crate::config::{Paths, StorageConfig};
use crate::core::CalendarDay;
use crate::error::HabitError;
use crate::habits::{Category, CompletionLog, Habit, HabitId, NewHabit};

/// Whether the store survives a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Backed by a database file.
    Durable,
    /// Backed by memory only; everything is lost on exit.
    InMemory,
}

/// Durable CRUD over the habit collection.
pub struct HabitStore {
    db: Database,
}

impl HabitStore {
    /// Open (or create) the store at `path`.
    ///
    /// Safe to call on every launch; pending schema upgrades are applied
    /// without losing data.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened.
    pub fn init(path: &Path) -> Result<Self, HabitError> {
        Ok(Self::with_database(Database::open_at(path)?))
    }

    /// Open the store at the default location under `~/.habitkit/`.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened.
    pub fn init_default() -> Result<Self, HabitError> {
        Ok(Self::with_database(Database::open()?))
    }

    /// Open a store that lives in memory only.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if `SQLite` cannot allocate the database.
    pub fn in_memory() -> Result<Self, HabitError> {
        Ok(Self::with_database(Database::open_in_memory()?))
    }

    /// Create a store over an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Open the store described by `config`.
    ///
    /// When the file is unavailable and `fallback_to_memory` is set, the
    /// session continues on an in-memory store and reports
    /// [`StorageMode::InMemory`] so the caller can warn the user.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the file cannot be opened and no
    /// fallback is allowed.
    pub fn init_with_config(
        config: &StorageConfig,
        paths: &Paths,
    ) -> Result<(Self, StorageMode), HabitError> {
        let path = config.database_path(paths);
        let opened = ensure_parent_dir(&path).and_then(|()| Self::init(&path));

        match opened {
            Ok(store) => Ok((store, StorageMode::Durable)),
            Err(HabitError::StorageUnavailable(reason)) if config.fallback_to_memory => {
                warn!(
                    "event=store_fallback module=store status=degraded path={} reason={reason}",
                    path.display()
                );
                Ok((Self::in_memory()?, StorageMode::InMemory))
            }
            Err(err) => Err(err),
        }
    }

    /// Current schema version of the backing database.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, HabitError> {
        self.db.schema_version()
    }

    /// Every stored habit in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` on I/O failure or a corrupt record.
    pub fn get_all(&self) -> Result<Vec<Habit>, HabitError> {
        let started_at = Instant::now();
        logged("habit_get_all", started_at, load_all(self.db.connection()))
    }

    /// A single habit, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageRead` on I/O failure or a corrupt record.
    pub fn get(&self, id: HabitId) -> Result<Option<Habit>, HabitError> {
        let started_at = Instant::now();
        logged("habit_get", started_at, load_habit(self.db.connection(), id))
    }

    /// Insert a new habit and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHabit` for an empty name, `StorageWrite` on failure.
    pub fn add(&self, habit: &NewHabit) -> Result<HabitId, HabitError> {
        let started_at = Instant::now();
        let result = validate_name(&habit.name).and_then(|name| self.insert(name, habit));
        if let Ok(id) = &result {
            info!("event=habit_add module=store status=ok id={id}");
        }
        logged("habit_add", started_at, result)
    }

    fn insert(&self, name: &str, habit: &NewHabit) -> Result<HabitId, HabitError> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to begin transaction: {e}")))?;

        tx.execute(
            "INSERT INTO habits (name, category, created_at) VALUES (?1, ?2, ?3)",
            params![name, habit.category.name(), habit.created_at.to_rfc3339()],
        )
        .map_err(|e| HabitError::StorageWrite(format!("Failed to insert habit: {e}")))?;

        let id = HabitId::new(tx.last_insert_rowid());
        write_completions(&tx, id, &habit.completion_dates)?;

        tx.commit()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to commit habit: {e}")))?;
        Ok(id)
    }

    /// Replace the stored record matching `habit.id`.
    ///
    /// Name, category and the full completion log are overwritten;
    /// `created_at` is immutable and ignored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such habit exists (the store is left
    /// unchanged), `InvalidHabit` for an empty name, `StorageWrite` on
    /// failure.
    pub fn update(&self, habit: &Habit) -> Result<(), HabitError> {
        let started_at = Instant::now();
        let result = validate_name(&habit.name).and_then(|name| self.replace(name, habit));
        logged("habit_update", started_at, result)
    }

    fn replace(&self, name: &str, habit: &Habit) -> Result<(), HabitError> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to begin transaction: {e}")))?;

        let changed = tx
            .execute(
                "UPDATE habits SET name = ?1, category = ?2 WHERE id = ?3",
                params![name, habit.category.name(), habit.id.get()],
            )
            .map_err(|e| HabitError::StorageWrite(format!("Failed to update habit: {e}")))?;
        if changed == 0 {
            return Err(HabitError::NotFound(habit.id));
        }

        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1",
            [habit.id.get()],
        )
        .map_err(|e| HabitError::StorageWrite(format!("Failed to clear completions: {e}")))?;
        write_completions(&tx, habit.id, &habit.completion_dates)?;

        tx.commit()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to commit habit: {e}")))
    }

    /// Permanently remove a habit and its completion history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id does not exist, `StorageWrite` on failure.
    pub fn delete(&self, id: HabitId) -> Result<(), HabitError> {
        let started_at = Instant::now();
        let result = self
            .db
            .connection()
            .execute("DELETE FROM habits WHERE id = ?1", [id.get()])
            .map_err(|e| HabitError::StorageWrite(format!("Failed to delete habit: {e}")))
            .and_then(|rows| {
                if rows == 0 {
                    Err(HabitError::NotFound(id))
                } else {
                    Ok(())
                }
            });
        if result.is_ok() {
            info!("event=habit_delete module=store status=ok id={id}");
        }
        logged("habit_delete", started_at, result)
    }

    /// Flip the completion flag of one day and return the updated habit.
    ///
    /// A day with no entry counts as not completed, so the first toggle
    /// marks it done. Toggling again stores an explicit `false`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id does not exist, `StorageWrite` on failure.
    pub fn toggle_day(&self, id: HabitId, day: CalendarDay) -> Result<Habit, HabitError> {
        let started_at = Instant::now();
        logged("habit_toggle_day", started_at, self.flip(id, day))
    }

    fn flip(&self, id: HabitId, day: CalendarDay) -> Result<Habit, HabitError> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to begin transaction: {e}")))?;

        let completed: Option<bool> = tx
            .query_row(
                "SELECT completed FROM habit_completions WHERE habit_id = ?1 AND day = ?2",
                params![id.get(), day.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to read completion: {e}")))?;

        tx.execute(
            r"INSERT INTO habit_completions (habit_id, day, completed)
              SELECT id, ?2, ?3 FROM habits WHERE id = ?1
              ON CONFLICT(habit_id, day) DO UPDATE SET completed = excluded.completed",
            params![id.get(), day.to_string(), !completed.unwrap_or(false)],
        )
        .map_err(|e| HabitError::StorageWrite(format!("Failed to toggle completion: {e}")))?;

        let habit = load_habit(&tx, id)
            .map_err(|e| HabitError::StorageWrite(e.to_string()))?
            .ok_or(HabitError::NotFound(id))?;

        tx.commit()
            .map_err(|e| HabitError::StorageWrite(format!("Failed to commit toggle: {e}")))?;
        Ok(habit)
    }
}

/// Raw `habits` row before its fields are validated.
struct HabitRow {
    id: i64,
    name: String,
    category: Option<String>,
    created_at: String,
}

impl HabitRow {
    const COLUMNS: &'static str = "id, name, category, created_at";

    fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_habit(self, completion_dates: CompletionLog) -> Result<Habit, HabitError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                HabitError::StorageRead(format!(
                    "Habit {} has invalid created_at `{}`: {e}",
                    self.id, self.created_at
                ))
            })?;

        Ok(Habit {
            id: HabitId::new(self.id),
            name: self.name,
            category: self.category.as_deref().map_or(Category::Other, Category::parse),
            completion_dates,
            created_at,
        })
    }
}

fn load_all(conn: &Connection) -> Result<Vec<Habit>, HabitError> {
    let mut stmt = conn
        .prepare(&format!("SELECT {} FROM habits ORDER BY id", HabitRow::COLUMNS))
        .map_err(|e| HabitError::StorageRead(format!("Failed to prepare query: {e}")))?;
    let rows = stmt
        .query_map([], HabitRow::from_row)
        .map_err(|e| HabitError::StorageRead(format!("Failed to query habits: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| HabitError::StorageRead(format!("Failed to read habit: {e}")))?;

    let mut logs = load_completions(conn, None)?;

    rows.into_iter()
        .map(|row| {
            let log = logs.remove(&row.id).unwrap_or_default();
            row.into_habit(log)
        })
        .collect()
}

fn load_habit(conn: &Connection, id: HabitId) -> Result<Option<Habit>, HabitError> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1", HabitRow::COLUMNS),
            [id.get()],
            HabitRow::from_row,
        )
        .optional()
        .map_err(|e| HabitError::StorageRead(format!("Failed to query habit: {e}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let log = load_completions(conn, Some(id))?
        .remove(&id.get())
        .unwrap_or_default();
    row.into_habit(log).map(Some)
}

/// Completion logs keyed by habit id, optionally restricted to one habit.
fn load_completions(
    conn: &Connection,
    habit: Option<HabitId>,
) -> Result<HashMap<i64, CompletionLog>, HabitError> {
    let mut stmt = conn
        .prepare(
            r"SELECT habit_id, day, completed FROM habit_completions
              WHERE ?1 IS NULL OR habit_id = ?1",
        )
        .map_err(|e| HabitError::StorageRead(format!("Failed to prepare query: {e}")))?;

    let rows = stmt
        .query_map([habit.map(HabitId::get)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
            ))
        })
        .map_err(|e| HabitError::StorageRead(format!("Failed to query completions: {e}")))?;

    let mut logs: HashMap<i64, CompletionLog> = HashMap::new();
    for row in rows {
        let (habit_id, key, completed) =
            row.map_err(|e| HabitError::StorageRead(format!("Failed to read completion: {e}")))?;
        let day: CalendarDay = key
            .parse()
            .map_err(|e| HabitError::StorageRead(format!("Habit {habit_id}: {e}")))?;
        logs.entry(habit_id).or_default().set(day, completed);
    }

    Ok(logs)
}

fn write_completions(
    conn: &Connection,
    id: HabitId,
    log: &CompletionLog,
) -> Result<(), HabitError> {
    let mut stmt = conn
        .prepare("INSERT INTO habit_completions (habit_id, day, completed) VALUES (?1, ?2, ?3)")
        .map_err(|e| HabitError::StorageWrite(format!("Failed to prepare insert: {e}")))?;

    for (day, completed) in log.iter() {
        stmt.execute(params![id.get(), day.to_string(), completed])
            .map_err(|e| HabitError::StorageWrite(format!("Failed to write completion: {e}")))?;
    }

    Ok(())
}

/// The name as it is stored: trimmed and non-empty.
fn validate_name(name: &str) -> Result<&str, HabitError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HabitError::InvalidHabit("name cannot be empty".to_string()));
    }
    Ok(name)
}

fn ensure_parent_dir(path: &Path) -> Result<(), HabitError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                HabitError::StorageUnavailable(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}

/// Log the outcome of a store operation and pass the result through.
fn logged<T>(
    event: &str,
    started_at: Instant,
    result: Result<T, HabitError>,
) -> Result<T, HabitError> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => debug!("event={event} module=store status=ok duration_ms={duration_ms}"),
        Err(err @ (HabitError::NotFound(_) | HabitError::InvalidHabit(_))) => {
            warn!(
                "event={event} module=store status=rejected duration_ms={duration_ms} error={err}"
            );
        }
        Err(err) => {
            error!(
                "event={event} module=store status=error duration_ms={duration_ms} error={err}"
            );
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn create_test_store() -> HabitStore {
        HabitStore::in_memory().unwrap()
    }

    fn sample_habit(name: &str) -> NewHabit {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        NewHabit::created_at(name, Category::Health, created_at)
    }

    #[test]
    fn test_add_and_get_all() {
        let store = create_test_store();

        let mut habit = sample_habit("Run");
        habit.completion_dates.set(day("2024-01-01"), true);
        habit.completion_dates.set(day("2024-01-02"), false);

        let id = store.add(&habit).unwrap();
        let all = store.get_all().unwrap();

        assert_eq!(all, vec![habit.with_id(id)]);
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let store = create_test_store();

        let first = store.add(&sample_habit("One")).unwrap();
        let second = store.add(&sample_habit("Two")).unwrap();
        assert!(second > first);

        store.delete(second).unwrap();
        let third = store.add(&sample_habit("Three")).unwrap();
        assert!(third > second);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let store = create_test_store();
        let err = store.add(&sample_habit("   ")).unwrap_err();

        assert!(matches!(err, HabitError::InvalidHabit(_)));
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_record() {
        let store = create_test_store();
        let mut habit = sample_habit("Read");
        habit.completion_dates.set(day("2024-01-01"), true);
        let id = store.add(&habit).unwrap();

        let mut updated = store.get(id).unwrap().unwrap();
        updated.name = "Read 20 pages".to_string();
        updated.category = Category::Learning;
        updated.completion_dates = CompletionLog::new();
        updated.completion_dates.set(day("2024-01-05"), true);
        store.update(&updated).unwrap();

        let loaded = store.get(id).unwrap().unwrap();
        assert_eq!(loaded, updated);
        assert!(!loaded.is_completed_on(day("2024-01-01")));
    }

    #[test]
    fn test_names_are_stored_trimmed() {
        let store = create_test_store();
        let mut habit = sample_habit("Run");
        habit.name = "  Run  ".to_string();
        let id = store.add(&habit).unwrap();

        let mut stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.name, "Run");

        stored.name = "   Walk ".to_string();
        store.update(&stored).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().name, "Walk");

        stored.name = " \t ".to_string();
        let err = store.update(&stored).unwrap_err();
        assert!(matches!(err, HabitError::InvalidHabit(_)));
    }

    #[test]
    fn test_update_ignores_created_at() {
        let store = create_test_store();
        let habit = sample_habit("Stretch");
        let id = store.add(&habit).unwrap();

        let mut changed = habit.clone().with_id(id);
        changed.created_at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        store.update(&changed).unwrap();

        assert_eq!(store.get(id).unwrap().unwrap().created_at, habit.created_at);
    }

    #[test]
    fn test_update_missing_is_not_found_and_changes_nothing() {
        let store = create_test_store();
        let id = store.add(&sample_habit("Walk")).unwrap();
        let before = store.get_all().unwrap();

        let mut ghost = sample_habit("Ghost").with_id(HabitId::new(id.get() + 100));
        ghost.completion_dates.set(day("2024-01-01"), true);
        let err = store.update(&ghost).unwrap_err();

        assert!(matches!(err, HabitError::NotFound(missing) if missing == ghost.id));
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn test_delete() {
        let store = create_test_store();
        let keep = store.add(&sample_habit("Keep")).unwrap();
        let mut doomed = sample_habit("Drop");
        doomed.completion_dates.set(day("2024-01-01"), true);
        let doomed = store.add(&doomed).unwrap();

        store.delete(doomed).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep);

        let orphans: i64 = store
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM habit_completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = create_test_store();
        let err = store.delete(HabitId::new(99)).unwrap_err();
        assert!(matches!(err, HabitError::NotFound(_)));
    }

    #[test]
    fn test_toggle_day() {
        let store = create_test_store();
        let id = store.add(&sample_habit("Floss")).unwrap();
        let today = day("2024-03-10");

        let habit = store.toggle_day(id, today).unwrap();
        assert!(habit.is_completed_on(today));

        let habit = store.toggle_day(id, today).unwrap();
        assert!(!habit.is_completed_on(today));
        // The day stays recorded as an explicit `false`.
        assert_eq!(habit.completion_dates.len(), 1);
        assert_eq!(store.get(id).unwrap().unwrap(), habit);
    }

    #[test]
    fn test_toggle_missing_is_not_found() {
        let store = create_test_store();
        let err = store.toggle_day(HabitId::new(5), day("2024-01-01")).unwrap_err();

        assert!(matches!(err, HabitError::NotFound(_)));
        let rows: i64 = store
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM habit_completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_round_trip_add_update_delete() {
        let store = create_test_store();
        let habit = sample_habit("Journal");
        let id = store.add(&habit).unwrap();
        assert!(store.get_all().unwrap().contains(&habit.clone().with_id(id)));

        let mut toggled = store.get(id).unwrap().unwrap();
        toggled.completion_dates.toggle(day("2024-02-01"));
        store.update(&toggled).unwrap();
        assert_eq!(store.get_all().unwrap(), vec![toggled]);

        store.delete(id).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_restart() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("habits.db");

        let id = {
            let store = HabitStore::init(&path).unwrap();
            let id = store.add(&sample_habit("Water plants")).unwrap();
            store.toggle_day(id, day("2024-04-01")).unwrap();
            id
        };

        let store = HabitStore::init(&path).unwrap();
        let habit = store.get(id).unwrap().unwrap();
        assert_eq!(habit.name, "Water plants");
        assert!(habit.is_completed_on(day("2024-04-01")));
    }

    #[test]
    fn test_corrupt_day_is_read_error() {
        let store = create_test_store();
        let id = store.add(&sample_habit("Run")).unwrap();
        store
            .db
            .connection()
            .execute(
                "INSERT INTO habit_completions (habit_id, day, completed) VALUES (?1, 'garbage', 1)",
                [id.get()],
            )
            .unwrap();

        let err = store.get_all().unwrap_err();
        assert!(matches!(err, HabitError::StorageRead(_)));
    }

    #[test]
    fn test_unknown_category_reads_as_other() {
        let store = create_test_store();
        let id = store.add(&sample_habit("Paint")).unwrap();
        store
            .db
            .connection()
            .execute("UPDATE habits SET category = 'Art' WHERE id = ?1", [id.get()])
            .unwrap();

        assert_eq!(store.get(id).unwrap().unwrap().category, Category::Other);
    }

    #[test]
    fn test_init_with_config_durable() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("home"));
        let config = StorageConfig::default();

        let (store, mode) = HabitStore::init_with_config(&config, &paths).unwrap();

        assert_eq!(mode, StorageMode::Durable);
        assert!(paths.database.exists());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_init_with_config_falls_back_to_memory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let paths = Paths::with_root(temp_dir.path().to_path_buf());
        let mut config = StorageConfig {
            database: Some(blocker.join("habits.db")),
            fallback_to_memory: true,
        };

        let (store, mode) = HabitStore::init_with_config(&config, &paths).unwrap();
        assert_eq!(mode, StorageMode::InMemory);
        store.add(&sample_habit("Still works")).unwrap();

        config.fallback_to_memory = false;
        let err = HabitStore::init_with_config(&config, &paths).err().unwrap();
        assert!(matches!(err, HabitError::StorageUnavailable(_)));
    }
}
