//! Rolling-window trends.

use serde::{Deserialize, Serialize};

use crate::core::CalendarDay;
use crate::habits::Habit;

/// Number of days in the trend window, today included.
pub const TREND_DAYS: u32 = 30;

/// One day on the trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: CalendarDay,
    /// Axis label in `M/D` form.
    pub label: String,
    /// Habits completed on `date`.
    pub completed: usize,
    /// Habit count at evaluation time, not on `date`.
    pub total: usize,
}

/// The trailing `n` days ending at `today`, oldest first.
///
/// Days before the earliest representable date are skipped.
pub fn last_days(today: CalendarDay, n: u32) -> Vec<CalendarDay> {
    let n = i32::try_from(n).unwrap_or(i32::MAX);
    (0..n)
        .rev()
        .filter_map(|offset| today.checked_sub_days(offset))
        .collect()
}

/// The week ending at `today`, oldest first.
pub fn last_7_days(today: CalendarDay) -> Vec<CalendarDay> {
    last_days(today, 7)
}

/// Completions per day over the last [`TREND_DAYS`] days, oldest first.
///
/// Always [`TREND_DAYS`] points, except within the first 29 days after the
/// earliest date chrono can represent, where the window is cut short.
pub fn chart_data(habits: &[Habit], today: CalendarDay) -> Vec<ChartPoint> {
    let total = habits.len();

    last_days(today, TREND_DAYS)
        .into_iter()
        .map(|date| ChartPoint {
            date,
            label: date.short_label(),
            completed: completed_on(habits, date),
            total,
        })
        .collect()
}

/// Share of possible completions achieved over the trend window, 0-100.
///
/// Rounded half-up; 0 when there are no habits.
pub fn completion_rate(habits: &[Habit], today: CalendarDay) -> u8 {
    let points = chart_data(habits, today);
    let completed: usize = points.iter().map(|p| p.completed).sum();
    let possible: usize = points.iter().map(|p| p.total).sum();
    rounded_percentage(completed, possible)
}

/// Number of habits completed on `date`.
pub fn completed_on(habits: &[Habit], date: CalendarDay) -> usize {
    habits.iter().filter(|h| h.is_completed_on(date)).count()
}

/// `part / whole` as a percentage rounded half-up, 0 for an empty whole.
pub(crate) fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let percent = (part.min(whole) * 200 + whole) / (2 * whole);
    u8::try_from(percent).unwrap_or(100)
}
