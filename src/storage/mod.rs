//! Storage layer for habitkit.
//!
//! This module provides SQLite-based persistence for habits and their
//! per-day completion flags, plus an async facade for callers running on
//! tokio.

mod async_store;
mod database;
mod habit_store;
mod migrations;

pub use async_store::AsyncHabitStore;
pub use database::Database;
pub use habit_store::{HabitStore, StorageMode};
pub use migrations::CURRENT_VERSION as SCHEMA_VERSION;
