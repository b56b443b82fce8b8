//! Habit records and their completion logs.

pub mod types;

pub use types::*;
