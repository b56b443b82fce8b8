use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::CalendarDay;

/// Store-assigned habit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(i64);

impl HabitId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Social,
    #[default]
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::Health,
        Self::Productivity,
        Self::Learning,
        Self::Mindfulness,
        Self::Social,
        Self::Other,
    ];

    /// Parse a stored category name. Unknown or empty names become `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "health" => Self::Health,
            "productivity" => Self::Productivity,
            "learning" => Self::Learning,
            "mindfulness" => Self::Mindfulness,
            "social" => Self::Social,
            _ => Self::Other,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Productivity => "Productivity",
            Self::Learning => "Learning",
            Self::Mindfulness => "Mindfulness",
            Self::Social => "Social",
            Self::Other => "Other",
        }
    }

    /// Chart color as a hex string.
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Health => "#10b981",
            Self::Productivity => "#3b82f6",
            Self::Learning => "#8b5cf6",
            Self::Mindfulness => "#ec4899",
            Self::Social => "#f59e0b",
            Self::Other => "#6b7280",
        }
    }

    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Health => "💪",
            Self::Productivity => "⚡",
            Self::Learning => "📚",
            Self::Mindfulness => "🧘",
            Self::Social => "👥",
            Self::Other => "📌",
        }
    }
}

impl From<Option<String>> for Category {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map_or(Self::Other, Self::parse)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sparse per-day completion flags.
///
/// Only days that were toggled at least once have an entry. A missing day
/// reads as not completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLog(BTreeMap<CalendarDay, bool>);

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, day: CalendarDay) -> bool {
        self.0.get(&day).copied().unwrap_or(false)
    }

    pub fn set(&mut self, day: CalendarDay, completed: bool) {
        self.0.insert(day, completed);
    }

    /// Flip the flag for `day` and return the new value.
    pub fn toggle(&mut self, day: CalendarDay) -> bool {
        let completed = !self.is_completed(day);
        self.0.insert(day, completed);
        completed
    }

    /// Completed days in ascending order.
    pub fn completed_days(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.0
            .iter()
            .filter_map(|(day, completed)| completed.then_some(*day))
    }

    pub fn completed_count(&self) -> usize {
        self.0.values().filter(|completed| **completed).count()
    }

    /// Every recorded entry, completed or not, in ascending day order.
    pub fn iter(&self) -> impl Iterator<Item = (CalendarDay, bool)> + '_ {
        self.0.iter().map(|(day, completed)| (*day, *completed))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CalendarDay, bool)> for CompletionLog {
    fn from_iter<I: IntoIterator<Item = (CalendarDay, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A habit that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completion_dates: CompletionLog,
    pub created_at: DateTime<Utc>,
}

impl NewHabit {
    /// Create an empty habit stamped with the current time.
    pub fn new(name: &str, category: Category) -> Self {
        Self::created_at(name, category, Utc::now())
    }

    pub fn created_at(name: &str, category: Category, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.trim().to_string(),
            category,
            completion_dates: CompletionLog::new(),
            created_at,
        }
    }

    /// Attach the id assigned by the store.
    pub fn with_id(self, id: HabitId) -> Habit {
        Habit {
            id,
            name: self.name,
            category: self.category,
            completion_dates: self.completion_dates,
            created_at: self.created_at,
        }
    }
}

/// A stored habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completion_dates: CompletionLog,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn is_completed_on(&self, day: CalendarDay) -> bool {
        self.completion_dates.is_completed(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_category_parse_defaults_to_other() {
        assert_eq!(Category::parse("Health"), Category::Health);
        assert_eq!(Category::parse(" mindfulness "), Category::Mindfulness);
        assert_eq!(Category::parse("Gardening"), Category::Other);
        assert_eq!(Category::parse(""), Category::Other);
    }

    #[test]
    fn test_category_deserialize_unknown() {
        let cat: Category = serde_json::from_str("\"Fitness\"").unwrap();
        assert_eq!(cat, Category::Other);
        let cat: Category = serde_json::from_str("\"Learning\"").unwrap();
        assert_eq!(cat, Category::Learning);
        let cat: Category = serde_json::from_str("null").unwrap();
        assert_eq!(cat, Category::Other);
        assert_eq!(serde_json::to_string(&Category::Social).unwrap(), "\"Social\"");
    }

    #[test]
    fn test_habit_with_null_category() {
        let habit: Habit = serde_json::from_str(
            r#"{"id":1,"name":"Walk","category":null,"completionDates":{},"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(habit.category, Category::Other);

        let habit: Habit =
            serde_json::from_str(r#"{"id":2,"name":"Nap","createdAt":"2024-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(habit.category, Category::Other);
        assert!(habit.completion_dates.is_empty());
    }

    #[test]
    fn test_completion_log_missing_is_false() {
        let log = CompletionLog::new();
        assert!(!log.is_completed(day("2024-01-01")));
        assert!(log.is_empty());
    }

    #[test]
    fn test_completion_log_toggle_keeps_entry() {
        let mut log = CompletionLog::new();
        assert!(log.toggle(day("2024-01-01")));
        assert!(!log.toggle(day("2024-01-01")));
        assert_eq!(log.len(), 1);
        assert_eq!(log.completed_count(), 0);
    }

    #[test]
    fn test_completed_days_sorted() {
        let log: CompletionLog = [
            (day("2024-01-03"), true),
            (day("2024-01-01"), true),
            (day("2024-01-02"), false),
        ]
        .into_iter()
        .collect();

        let days: Vec<_> = log.completed_days().collect();
        assert_eq!(days, vec![day("2024-01-01"), day("2024-01-03")]);
    }

    #[test]
    fn test_new_habit_trims_name() {
        let habit = NewHabit::new("  Read  ", Category::Learning);
        assert_eq!(habit.name, "Read");
        assert!(habit.completion_dates.is_empty());
    }

    #[test]
    fn test_habit_json_shape() {
        let mut habit = NewHabit::new("Run", Category::Health).with_id(HabitId::new(3));
        habit.completion_dates.set(day("2024-01-01"), true);

        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["category"], "Health");
        assert_eq!(json["completionDates"]["2024-01-01"], true);
    }
}
