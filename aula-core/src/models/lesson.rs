//! Lessons parsed from the persisted calendar response.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::value_id;
use crate::error::CoreError;

/// Prefix used when a substitute teacher covers a lesson.
const SUBSTITUTE_PREFIX: &str = "VIKAR: ";

/// One lesson for one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEvent {
    /// `"<title>, <teacher>"`.
    pub summary: String,
    /// Lesson start.
    pub start: DateTime<FixedOffset>,
    /// Lesson end.
    pub end: DateTime<FixedOffset>,
    /// Teacher annotation; `VIKAR: <name>` for a substitute.
    pub teacher: String,
}

impl LessonEvent {
    /// Returns true when the lesson overlaps `[from, to)`.
    pub fn overlaps(&self, from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> bool {
        self.start < to && self.end > from
    }
}

/// Extracts one child's lessons from a calendar events response.
///
/// An event belongs to a child when its first `belongsToProfiles` entry is the
/// child id. Entries that are not lessons, or whose times do not parse, are
/// skipped.
///
/// # Errors
///
/// Returns an error if the response has no `data` array.
pub fn parse_lessons(response: &Value, child_id: &str) -> Result<Vec<LessonEvent>, CoreError> {
    let events = response
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::MissingField("data".to_string()))?;

    Ok(events
        .iter()
        .filter(|e| e.get("type").and_then(Value::as_str) == Some("lesson"))
        .filter(|e| {
            e.pointer("/belongsToProfiles/0")
                .and_then(value_id)
                .is_some_and(|id| id == child_id)
        })
        .filter_map(parse_lesson)
        .collect())
}

fn parse_lesson(event: &Value) -> Option<LessonEvent> {
    let title = event.get("title").and_then(Value::as_str).unwrap_or_default();
    let start = parse_time(event.get("startDateTime")?.as_str()?)?;
    let end = parse_time(event.get("endDateTime")?.as_str()?)?;
    let teacher = lesson_teacher(event);

    Some(LessonEvent {
        summary: format!("{title}, {teacher}"),
        start,
        end,
        teacher,
    })
}

/// Teacher annotation: a substitute wins, then the first participant's
/// initials, then their name, then nothing.
fn lesson_teacher(event: &Value) -> String {
    let participants = event
        .pointer("/lesson/participants")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let substitute = participants.iter().find(|p| {
        p.get("participantRole").and_then(Value::as_str) == Some("substituteTeacher")
    });
    if let Some(sub) = substitute {
        let name = sub.get("teacherName").and_then(Value::as_str).unwrap_or_default();
        return format!("{SUBSTITUTE_PREFIX}{name}");
    }

    let first = participants.first();
    first
        .and_then(|p| p.get("teacherInitials"))
        .and_then(Value::as_str)
        .or_else(|| first.and_then(|p| p.get("teacherName")).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn parse_time(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}
