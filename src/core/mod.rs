//! Core abstractions for habitkit.
//!
//! Calendar-day arithmetic and the clock the rest of the crate reads
//! "today" from.

mod clock;
mod day;

pub use clock::{Clock, FixedClock, SystemClock};
pub use day::{CalendarDay, DayParseError, DAY_FORMAT};

#[cfg(test)]
pub use clock::MockClock;
