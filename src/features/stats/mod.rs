//! Statistics over the habit collection.
//!
//! Everything here is a pure function of the habits and a reference day:
//! - Current and best streaks
//! - The 30-day completion trend and rate
//! - Category and per-habit breakdowns
//! - Today's progress and the month calendar

pub mod aggregate;
pub mod calendar;
pub mod dashboard;
pub mod streak;
pub mod trend;

pub use aggregate::{
    category_data, habit_summaries, today_stats, CategoryCount, HabitSummary, TodayStats,
};
pub use calendar::{calendar_days, month_cells, shift_month, CalendarCell, DayIntensity};
pub use dashboard::Dashboard;
pub use streak::{best_streak, current_streak, StreakInfo, STREAK_SCAN_DAYS};
pub use trend::{
    chart_data, completed_on, completion_rate, last_7_days, last_days, ChartPoint, TREND_DAYS,
};
