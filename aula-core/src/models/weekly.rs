//! Weekly plan buckets and ISO week labels.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Weekday
// ============================================================================

/// School weekday, named the way the task-list provider names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Monday.
    Mandag,
    /// Tuesday.
    Tirsdag,
    /// Wednesday.
    Onsdag,
    /// Thursday.
    Torsdag,
    /// Friday.
    Fredag,
}

impl Weekday {
    /// All school days, Monday first.
    pub const ALL: [Self; 5] = [
        Self::Mandag,
        Self::Tirsdag,
        Self::Onsdag,
        Self::Torsdag,
        Self::Fredag,
    ];

    /// Parses a Danish weekday name. Case-insensitive.
    pub fn from_danish(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "mandag" => Some(Self::Mandag),
            "tirsdag" => Some(Self::Tirsdag),
            "onsdag" => Some(Self::Onsdag),
            "torsdag" => Some(Self::Torsdag),
            "fredag" => Some(Self::Fredag),
            _ => None,
        }
    }

    /// Danish name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mandag => "Mandag",
            Self::Tirsdag => "Tirsdag",
            Self::Onsdag => "Onsdag",
            Self::Torsdag => "Torsdag",
            Self::Fredag => "Fredag",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Task Entry
// ============================================================================

/// One assignment from the task-list provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Team name, from the first team the task is assigned to.
    #[serde(rename = "hold_navn", skip_serializing_if = "Option::is_none", default)]
    pub team: Option<String>,
    /// Task title.
    pub title: String,
    /// Whether the child has marked the task done.
    #[serde(rename = "erFaerdig")]
    pub done: bool,
    /// Provider task type.
    #[serde(rename = "opgaveType")]
    pub task_type: String,
    /// Due date as `dd-mm-YYYY HH:MM` (UTC).
    #[serde(rename = "afleveringsdato")]
    pub due: String,
    /// Week number as reported by the provider.
    #[serde(rename = "ugenummer")]
    pub week_number: serde_json::Value,
}

// ============================================================================
// Week Tasks
// ============================================================================

/// Tasks for one child for one week, bucketed per school day.
///
/// Every weekday is always present, empty when there is nothing that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTasks {
    days: BTreeMap<Weekday, Vec<TaskEntry>>,
}

impl WeekTasks {
    /// Creates empty buckets for all five days.
    pub fn new() -> Self {
        Self {
            days: Weekday::ALL.iter().map(|d| (*d, Vec::new())).collect(),
        }
    }

    /// Appends a task to a day.
    pub fn push(&mut self, day: Weekday, task: TaskEntry) {
        self.days.entry(day).or_default().push(task);
    }

    /// Tasks for a day.
    pub fn day(&self, day: Weekday) -> &[TaskEntry] {
        self.days.get(&day).map_or(&[], Vec::as_slice)
    }

    /// Total number of tasks.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Returns true when no day has tasks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(day, tasks)` Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TaskEntry])> {
        self.days.iter().map(|(d, t)| (*d, t.as_slice()))
    }
}

impl Default for WeekTasks {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Week Slots
// ============================================================================

/// Which of the two tracked weeks a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekSlot {
    /// The ISO week containing today.
    ThisWeek,
    /// The ISO week after that.
    NextWeek,
}

impl WeekSlot {
    /// Both slots, current week first.
    pub const BOTH: [Self; 2] = [Self::ThisWeek, Self::NextWeek];

    /// Week label for this slot relative to `today`.
    pub fn label(self, today: NaiveDate) -> WeekLabel {
        match self {
            Self::ThisWeek => WeekLabel::of(today),
            Self::NextWeek => WeekLabel::of(today + Duration::weeks(1)),
        }
    }
}

/// A value kept for this week and next week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPair<T> {
    /// Current week.
    pub this_week: T,
    /// Next week.
    pub next_week: T,
}

impl<T> WeekPair<T> {
    /// Value for a slot.
    pub fn get(&self, slot: WeekSlot) -> &T {
        match slot {
            WeekSlot::ThisWeek => &self.this_week,
            WeekSlot::NextWeek => &self.next_week,
        }
    }

    /// Mutable value for a slot.
    pub fn get_mut(&mut self, slot: WeekSlot) -> &mut T {
        match slot {
            WeekSlot::ThisWeek => &mut self.this_week,
            WeekSlot::NextWeek => &mut self.next_week,
        }
    }
}

// ============================================================================
// Week Label
// ============================================================================

/// ISO-8601 week label such as `2024-W07`, as providers expect it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekLabel(String);

impl WeekLabel {
    /// Label of the ISO week containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        let week = date.iso_week();
        Self(format!("{}-W{:02}", week.year(), week.week()))
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str) -> TaskEntry {
        TaskEntry {
            team: Some("3.a".to_string()),
            title: title.to_string(),
            done: false,
            task_type: "Opgave".to_string(),
            due: "01-02-2024 08:00".to_string(),
            week_number: serde_json::json!(5),
        }
    }

    #[test]
    fn test_new_has_all_days_empty() {
        let tasks = WeekTasks::new();
        assert_eq!(tasks.iter().count(), 5);
        assert!(tasks.is_empty());
        for day in Weekday::ALL {
            assert!(tasks.day(day).is_empty());
        }
    }

    #[test]
    fn test_push_buckets_by_day() {
        let mut tasks = WeekTasks::new();
        tasks.push(Weekday::Onsdag, task("Læs side 4"));
        tasks.push(Weekday::Onsdag, task("Regn opgave 2"));
        assert_eq!(tasks.day(Weekday::Onsdag).len(), 2);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.day(Weekday::Mandag).is_empty());
    }

    #[test]
    fn test_weekday_parsing() {
        assert_eq!(Weekday::from_danish("Mandag"), Some(Weekday::Mandag));
        assert_eq!(Weekday::from_danish("fredag "), Some(Weekday::Fredag));
        assert_eq!(Weekday::from_danish("Lørdag"), None);
    }

    #[test]
    fn test_task_serializes_with_provider_keys() {
        let json = serde_json::to_value(task("x")).unwrap();
        assert_eq!(json["hold_navn"], "3.a");
        assert_eq!(json["erFaerdig"], false);
        assert_eq!(json["afleveringsdato"], "01-02-2024 08:00");
    }

    #[test]
    fn test_iso_week_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        assert_eq!(WeekLabel::of(d).as_str(), "2024-W07");
        // 2021-01-01 belongs to ISO week 53 of 2020
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(WeekLabel::of(d).as_str(), "2020-W53");
    }

    #[test]
    fn test_slot_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(WeekSlot::ThisWeek.label(d).as_str(), "2025-W01");
        assert_eq!(WeekSlot::NextWeek.label(d).as_str(), "2025-W02");
    }
}
