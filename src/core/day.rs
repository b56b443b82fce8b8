//! Calendar-day value type.
//!
//! Every date comparison in habitkit happens at calendar-day granularity.
//! `CalendarDay` stores the number of days since 1970-01-01, so consecutive
//! days differ by exactly one and no timezone parsing is involved once a
//! day has been constructed.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Storage and display format of a day key.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A single local calendar day.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(i32);

/// Error returned when a day key is not a valid `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid calendar day `{0}`: expected YYYY-MM-DD")]
pub struct DayParseError(String);

impl CalendarDay {
    /// 1970-01-01.
    pub const EPOCH: Self = Self(0);

    /// Build a day from a chrono date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// Build a day from year, month (1-12) and day of month.
    ///
    /// Returns `None` for dates that do not exist.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_date)
    }

    /// Build a day from its day number.
    ///
    /// Returns `None` outside the range chrono can represent.
    #[must_use]
    pub fn from_days_since_epoch(days: i32) -> Option<Self> {
        days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|_| Self(days))
    }

    /// The opaque day number.
    #[must_use]
    pub const fn days_since_epoch(self) -> i32 {
        self.0
    }

    /// Today in the local timezone.
    #[must_use]
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Convert back to a chrono date.
    #[must_use]
    pub fn to_date(self) -> NaiveDate {
        // Every constructor validates the range, so the fallback is unreachable.
        NaiveDate::from_num_days_from_ce_opt(self.0 + UNIX_EPOCH_DAYS_FROM_CE).unwrap_or_default()
    }

    /// The day `days` after this one.
    #[must_use]
    pub fn checked_add_days(self, days: i32) -> Option<Self> {
        self.0.checked_add(days).and_then(Self::from_days_since_epoch)
    }

    /// The day `days` before this one.
    #[must_use]
    pub fn checked_sub_days(self, days: i32) -> Option<Self> {
        self.0.checked_sub(days).and_then(Self::from_days_since_epoch)
    }

    /// Signed number of days from `earlier` to `self`.
    #[must_use]
    pub fn days_since(self, earlier: Self) -> i64 {
        i64::from(self.0) - i64::from(earlier.0)
    }

    /// Weekday index with Sunday = 0.
    #[must_use]
    pub fn weekday_from_sunday(self) -> u32 {
        self.to_date().weekday().num_days_from_sunday()
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.to_date().year()
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.to_date().month()
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(self) -> u32 {
        self.to_date().day()
    }

    /// Compact `M/D` label used on chart axes.
    #[must_use]
    pub fn short_label(self) -> String {
        let date = self.to_date();
        format!("{}/{}", date.month(), date.day())
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl FromStr for CalendarDay {
    type Err = DayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(Self::from_date)
            .map_err(|_| DayParseError(s.to_string()))
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_date().format(DAY_FORMAT))
    }
}

impl fmt::Debug for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalendarDay({self})")
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
