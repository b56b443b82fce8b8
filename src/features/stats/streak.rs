//! Streak calculations.
//!
//! The current streak looks back at most [`STREAK_SCAN_DAYS`] days from
//! today. The best streak walks the full history. Both are kept exactly
//! as the dashboard has always shown them.

use serde::{Deserialize, Serialize};

use crate::core::CalendarDay;
use crate::habits::Habit;

/// How far back the current streak scan goes, today included.
pub const STREAK_SCAN_DAYS: u32 = 365;

/// Consecutive completed days ending today.
///
/// Returns 0 when today itself is not completed. Capped at
/// [`STREAK_SCAN_DAYS`].
pub fn current_streak(habit: &Habit, today: CalendarDay) -> u32 {
    let mut streak = 0;
    let mut check_date = Some(today);

    while let Some(date) = check_date {
        if streak == STREAK_SCAN_DAYS || !habit.is_completed_on(date) {
            break;
        }
        streak += 1;
        check_date = date.checked_sub_days(1);
    }

    streak
}

/// Longest run of consecutive completed days anywhere in the history.
pub fn best_streak(habit: &Habit) -> u32 {
    let mut longest = 0;
    let mut streak = 0;
    let mut prev_date: Option<CalendarDay> = None;

    // `completed_days` is already sorted ascending and free of duplicates.
    for date in habit.completion_dates.completed_days() {
        streak = match prev_date {
            Some(prev) if date.days_since(prev) == 1 => streak + 1,
            _ => 1,
        };
        longest = longest.max(streak);
        prev_date = Some(date);
    }

    longest
}

/// Streak information for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Current streak ending today
    pub current: u32,
    /// Longest streak ever
    pub longest: u32,
    /// Most recent completed day
    pub last_completion: Option<CalendarDay>,
}

impl StreakInfo {
    /// Calculate streaks for `habit` as of `today`.
    pub fn calculate(habit: &Habit, today: CalendarDay) -> Self {
        Self {
            current: current_streak(habit, today),
            longest: best_streak(habit),
            last_completion: habit.completion_dates.completed_days().last(),
        }
    }
}
