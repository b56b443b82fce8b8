//! Month calendar layout.
//!
//! Weeks start on Sunday. The first row is padded with empty slots so day 1
//! lands under its weekday column.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trend::{completed_on, rounded_percentage};
use crate::core::CalendarDay;
use crate::habits::Habit;

/// Day-of-month numbers for `year`/`month` (1-12), left-padded with `None`
/// up to the weekday of the 1st.
///
/// An invalid month yields an empty grid.
pub fn calendar_days(year: i32, month: u32) -> Vec<Option<u32>> {
    let Some(first) = CalendarDay::from_ymd(year, month, 1) else {
        return Vec::new();
    };

    let padding = first.weekday_from_sunday() as usize;
    std::iter::repeat(None)
        .take(padding)
        .chain((1..=days_in_month(year, month)).map(Some))
        .collect()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(year, month, *day).is_some())
        .unwrap_or(28)
}

/// Move `delta` months from `year`/`month`, rolling over years.
///
/// Returns `None` for an invalid month or a result outside `i32` years.
pub fn shift_month(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    if !(1..=12).contains(&month) {
        return None;
    }

    let index = i64::from(year) * 12 + i64::from(month - 1) + i64::from(delta);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// How full a calendar day is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayIntensity {
    /// After today; nothing to show yet
    Future,
    /// Every habit completed
    Full,
    /// At least half completed
    High,
    /// Some completed
    Low,
    /// None completed
    Empty,
}

/// One filled slot of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: CalendarDay,
    pub day: u32,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub is_today: bool,
    pub intensity: DayIntensity,
}

impl CalendarCell {
    fn new(habits: &[Habit], date: CalendarDay, today: CalendarDay) -> Self {
        let completed = completed_on(habits, date);
        let total = habits.len();

        let intensity = if date > today {
            DayIntensity::Future
        } else if total > 0 && completed == total {
            DayIntensity::Full
        } else if total > 0 && completed * 2 >= total {
            DayIntensity::High
        } else if completed > 0 {
            DayIntensity::Low
        } else {
            DayIntensity::Empty
        };

        Self {
            date,
            day: date.day(),
            completed,
            total,
            percentage: rounded_percentage(completed, total),
            is_today: date == today,
            intensity,
        }
    }
}

/// The [`calendar_days`] grid with completion data filled in.
pub fn month_cells(
    habits: &[Habit],
    year: i32,
    month: u32,
    today: CalendarDay,
) -> Vec<Option<CalendarCell>> {
    calendar_days(year, month)
        .into_iter()
        .map(|slot| {
            slot.and_then(|day| CalendarDay::from_ymd(year, month, day))
                .map(|date| CalendarCell::new(habits, date, today))
        })
        .collect()
}
