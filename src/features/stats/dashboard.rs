//! Headline numbers for the dashboard.

use serde::{Deserialize, Serialize};

use super::aggregate::{today_stats, TodayStats};
use super::streak::best_streak;
use super::trend::completion_rate;
use crate::core::{CalendarDay, Clock};
use crate::habits::Habit;

/// Summary cards shown above the charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub today: TodayStats,
    /// Trailing 30-day completion rate, 0-100
    pub completion_rate: u8,
    /// Best streak of any single habit
    pub best_streak: u32,
    pub habit_count: usize,
}

impl Dashboard {
    /// Compute the dashboard as of `today`.
    pub fn build(habits: &[Habit], today: CalendarDay) -> Self {
        Self {
            today: today_stats(habits, today),
            completion_rate: completion_rate(habits, today),
            best_streak: habits.iter().map(best_streak).max().unwrap_or(0),
            habit_count: habits.len(),
        }
    }

    /// Compute the dashboard for the day `clock` reports.
    pub fn now(habits: &[Habit], clock: &dyn Clock) -> Self {
        Self::build(habits, clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockClock;
    use crate::habits::{Category, HabitId, NewHabit};

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn habit_with(id: i64, days: &[&str]) -> Habit {
        let mut habit = NewHabit::new("Test", Category::Other).with_id(HabitId::new(id));
        for d in days {
            habit.completion_dates.set(day(d), true);
        }
        habit
    }

    #[test]
    fn test_dashboard_empty() {
        let dashboard = Dashboard::build(&[], day("2024-01-10"));

        assert_eq!(dashboard.today, TodayStats { completed: 0, total: 0 });
        assert_eq!(dashboard.completion_rate, 0);
        assert_eq!(dashboard.best_streak, 0);
        assert_eq!(dashboard.habit_count, 0);
    }

    #[test]
    fn test_dashboard_build() {
        let habits = vec![
            habit_with(1, &["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10"]),
            habit_with(2, &["2024-01-09", "2024-01-10"]),
        ];

        let dashboard = Dashboard::build(&habits, day("2024-01-10"));

        assert_eq!(dashboard.today, TodayStats { completed: 2, total: 2 });
        assert_eq!(dashboard.today.percentage(), 100);
        // 6 of 60 possible
        assert_eq!(dashboard.completion_rate, 10);
        assert_eq!(dashboard.best_streak, 3);
        assert_eq!(dashboard.habit_count, 2);
    }

    #[test]
    fn test_dashboard_reads_today_from_clock() {
        let habits = vec![habit_with(1, &["2024-02-29"])];

        let mut clock = MockClock::new();
        clock.expect_today().times(1).return_const(day("2024-02-29"));

        let dashboard = Dashboard::now(&habits, &clock);
        assert_eq!(dashboard.today.completed, 1);
    }
}
