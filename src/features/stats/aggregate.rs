//! Aggregates over the whole habit collection.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::streak::{best_streak, current_streak};
use super::trend::{completed_on, rounded_percentage};
use crate::core::CalendarDay;
use crate::habits::{Category, Habit, HabitId};

/// Number of habits in one category.
///
/// Serializes as `{ "name", "value", "color" }`, the record the category
/// chart reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "name")]
    pub category: Category,
    pub value: usize,
}

impl Serialize for CategoryCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CategoryCount", 3)?;
        state.serialize_field("name", &self.category)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("color", self.color())?;
        state.end()
    }
}

impl CategoryCount {
    pub const fn name(&self) -> &'static str {
        self.category.name()
    }

    pub const fn color(&self) -> &'static str {
        self.category.color()
    }
}

/// Habit counts per category, in order of first appearance.
///
/// Categories with no habits are omitted.
pub fn category_data(habits: &[Habit]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();

    for habit in habits {
        match counts.iter_mut().find(|c| c.category == habit.category) {
            Some(entry) => entry.value += 1,
            None => counts.push(CategoryCount {
                category: habit.category,
                value: 1,
            }),
        }
    }

    counts
}

/// Completion snapshot for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayStats {
    pub completed: usize,
    pub total: usize,
}

impl TodayStats {
    /// Completed share, 0-100, rounded half-up.
    pub fn percentage(&self) -> u8 {
        rounded_percentage(self.completed, self.total)
    }
}

/// How many habits are done today, out of how many.
pub fn today_stats(habits: &[Habit], today: CalendarDay) -> TodayStats {
    TodayStats {
        completed: completed_on(habits, today),
        total: habits.len(),
    }
}

/// Per-habit totals for the "completion by habit" chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub id: HabitId,
    pub name: String,
    pub category: Category,
    /// Completed days over the whole history
    pub completions: usize,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// One summary per habit, in input order.
pub fn habit_summaries(habits: &[Habit], today: CalendarDay) -> Vec<HabitSummary> {
    habits
        .iter()
        .map(|habit| HabitSummary {
            id: habit.id,
            name: habit.name.clone(),
            category: habit.category,
            completions: habit.completion_dates.completed_count(),
            current_streak: current_streak(habit, today),
            best_streak: best_streak(habit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::NewHabit;

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn habit(id: i64, name: &str, category: Category, days: &[&str]) -> Habit {
        let mut habit = NewHabit::new(name, category).with_id(HabitId::new(id));
        for d in days {
            habit.completion_dates.set(day(d), true);
        }
        habit
    }

    #[test]
    fn test_category_data_first_appearance_order() {
        let habits = vec![
            habit(1, "Run", Category::Health, &[]),
            habit(2, "Read", Category::Learning, &[]),
            habit(3, "Swim", Category::Health, &[]),
            habit(4, "Misc", Category::parse("Gardening"), &[]),
        ];

        let data = category_data(&habits);

        assert_eq!(
            data,
            vec![
                CategoryCount { category: Category::Health, value: 2 },
                CategoryCount { category: Category::Learning, value: 1 },
                CategoryCount { category: Category::Other, value: 1 },
            ]
        );
        assert_eq!(data[2].name(), "Other");
        assert_eq!(data[0].color(), "#10b981");
    }

    #[test]
    fn test_category_count_json_shape() {
        let data = category_data(&[habit(1, "Run", Category::Health, &[])]);
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{ "name": "Health", "value": 1, "color": "#10b981" }])
        );

        let back: Vec<CategoryCount> = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_category_data_empty() {
        assert!(category_data(&[]).is_empty());
    }

    #[test]
    fn test_today_stats() {
        let today = day("2024-05-01");
        let habits = vec![
            habit(1, "A", Category::Other, &["2024-05-01"]),
            habit(2, "B", Category::Other, &["2024-04-30"]),
            habit(3, "C", Category::Other, &["2024-05-01"]),
        ];

        let stats = today_stats(&habits, today);
        assert_eq!(stats, TodayStats { completed: 2, total: 3 });
        assert_eq!(stats.percentage(), 67);
    }

    #[test]
    fn test_today_stats_empty() {
        let stats = today_stats(&[], day("2024-05-01"));
        assert_eq!(stats, TodayStats { completed: 0, total: 0 });
        assert_eq!(stats.percentage(), 0);
    }

    #[test]
    fn test_habit_summaries() {
        let today = day("2024-05-03");
        let mut floss = habit(2, "Floss", Category::Health, &["2024-05-02", "2024-05-03"]);
        floss.completion_dates.set(day("2024-05-01"), false);
        let habits = vec![habit(1, "Read", Category::Learning, &["2024-04-01"]), floss];

        let summaries = habit_summaries(&habits, today);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].completions, 1);
        assert_eq!(summaries[0].current_streak, 0);
        assert_eq!(summaries[0].best_streak, 1);
        assert_eq!(summaries[1].name, "Floss");
        assert_eq!(summaries[1].completions, 2);
        assert_eq!(summaries[1].current_streak, 2);
    }
}
