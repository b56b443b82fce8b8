//! habitkit - a habit tracking core
//!
//! Persists habits and their daily completion flags in SQLite and derives
//! streaks, trends and calendar views from them.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod habits;
pub mod logging;
pub mod storage;

pub use crate::core::{CalendarDay, Clock, FixedClock, SystemClock};
pub use config::{Config, Paths};
pub use error::HabitError;
pub use features::stats::Dashboard;
pub use habits::{Category, CompletionLog, Habit, HabitId, NewHabit};
pub use storage::{AsyncHabitStore, HabitStore, StorageMode};
