//! Database migrations for habitkit.
//!
//! Each migration upgrades the schema by one version inside its own
//! transaction, together with the `PRAGMA user_version` bump, so a crash
//! mid-upgrade leaves the previous version intact.

use std::collections::BTreeMap;

use log::info;
use rusqlite::{params, Connection};

use crate::core::CalendarDay;
use crate::error::HabitError;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, HabitError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| HabitError::StorageUnavailable(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), HabitError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| HabitError::StorageUnavailable(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
///
/// Refuses databases written by a newer schema rather than guessing at
/// their layout.
pub fn run(conn: &Connection) -> Result<(), HabitError> {
    let current = get_version(conn)?;

    if current > CURRENT_VERSION {
        return Err(HabitError::StorageUnavailable(format!(
            "Database schema version {current} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        let tx = conn.unchecked_transaction().map_err(|e| {
            HabitError::StorageUnavailable(format!("Failed to begin migration v{version}: {e}"))
        })?;
        run_migration(&tx, version)?;
        set_version(&tx, version)?;
        tx.commit().map_err(|e| {
            HabitError::StorageUnavailable(format!("Failed to commit migration v{version}: {e}"))
        })?;
        info!("event=db_migrate module=storage status=ok version={version}");
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), HabitError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(HabitError::StorageUnavailable(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: one row per habit, completion flags kept as a JSON object
/// keyed by `YYYY-MM-DD`.
fn migrate_v1(conn: &Connection) -> Result<(), HabitError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS habits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT,
            completion_dates TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| HabitError::StorageUnavailable(format!("Migration v1 failed: {e}")))
}

/// Migration v2: completion flags move to `habit_completions`, one row per
/// toggled day.
///
/// Existing JSON maps are copied over before the column is dropped.
fn migrate_v2(conn: &Connection) -> Result<(), HabitError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS habit_completions (
            habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            completed INTEGER NOT NULL,
            PRIMARY KEY (habit_id, day)
        );
        ",
    )
    .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))?;

    let legacy = {
        let mut stmt = conn
            .prepare("SELECT id, completion_dates FROM habits")
            .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))?
    };

    for (habit_id, json) in legacy {
        let flags: BTreeMap<String, bool> = serde_json::from_str(&json).map_err(|e| {
            HabitError::StorageUnavailable(format!(
                "Migration v2: habit {habit_id} has unreadable completion dates: {e}"
            ))
        })?;

        for (key, completed) in flags {
            let day: CalendarDay = key.parse().map_err(|e| {
                HabitError::StorageUnavailable(format!("Migration v2: habit {habit_id}: {e}"))
            })?;
            conn.execute(
                "INSERT OR REPLACE INTO habit_completions (habit_id, day, completed) VALUES (?1, ?2, ?3)",
                params![habit_id, day.to_string(), completed],
            )
            .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))?;
        }
    }

    conn.execute_batch("ALTER TABLE habits DROP COLUMN completion_dates;")
        .map_err(|e| HabitError::StorageUnavailable(format!("Migration v2 failed: {e}")))
}
