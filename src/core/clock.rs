//! Source of the current date and time.

use chrono::{DateTime, Utc};

use super::day::CalendarDay;

/// Supplies "now" to code that needs the local date.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current local calendar day.
    fn today(&self) -> CalendarDay;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> CalendarDay {
        CalendarDay::today()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: CalendarDay,
}

impl FixedClock {
    /// Freeze the clock at `now`, reporting `today` as the local day.
    #[must_use]
    pub const fn new(now: DateTime<Utc>, today: CalendarDay) -> Self {
        Self { now, today }
    }

    /// Freeze the clock at midnight UTC of `today`.
    #[must_use]
    pub fn at_day(today: CalendarDay) -> Self {
        let now = today.to_date().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        Self { now, today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> CalendarDay {
        self.today
    }
}
