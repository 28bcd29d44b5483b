//! JSON output formatting.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use aula_core::{AulaSnapshot, LessonEvent, MessageSummary, WeekPair, WeekTasks};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    pub children: Vec<ChildOutput>,
    pub unread_count: usize,
    pub messages: &'a [MessageSummary],
    pub tasks: &'a WeekPair<HashMap<String, WeekTasks>>,
    pub weekly_letters: &'a WeekPair<HashMap<String, String>>,
    pub reminders: &'a HashMap<String, String>,
    pub widgets: &'a BTreeMap<String, String>,
}

/// One child with presence.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOutput {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub institution: String,
    pub presence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

/// One lesson.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutput<'a> {
    pub summary: &'a str,
    pub teacher: &'a str,
    pub start: String,
    pub end: String,
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a refresh result.
    pub fn format_snapshot(&self, snapshot: &AulaSnapshot) -> Result<String> {
        self.format(&snapshot_to_output(snapshot))
    }

    /// Formats lessons grouped per child.
    pub fn format_lessons(&self, lessons: &BTreeMap<String, Vec<LessonEvent>>) -> Result<String> {
        let output: BTreeMap<&str, Vec<LessonOutput<'_>>> = lessons
            .iter()
            .map(|(child, events)| {
                let events = events
                    .iter()
                    .map(|e| LessonOutput {
                        summary: &e.summary,
                        teacher: &e.teacher,
                        start: e.start.to_rfc3339(),
                        end: e.end.to_rfc3339(),
                    })
                    .collect();
                (child.as_str(), events)
            })
            .collect();
        self.format(&output)
    }
}

/// Converts a snapshot to its JSON shape.
pub fn snapshot_to_output(snapshot: &AulaSnapshot) -> SnapshotOutput<'_> {
    let children = snapshot
        .context
        .children()
        .map(|(institution, child)| {
            let presence = snapshot.presence_of(&child.id);
            let record = presence.and_then(|p| p.record());
            ChildOutput {
                id: child.id.clone(),
                name: child.name.clone(),
                display_name: format!("{} {}", institution.name, child.first_name()),
                institution: institution.name.clone(),
                presence: presence.map_or_else(|| "-".to_string(), aula_core::Presence::label),
                status_code: record.map(|r| r.status.code()),
                attributes: record.map(aula_core::PresenceRecord::attributes).unwrap_or_default(),
            }
        })
        .collect();

    SnapshotOutput {
        updated_at: snapshot.updated_at,
        children,
        unread_count: snapshot.messages.count(),
        messages: snapshot.messages.messages(),
        tasks: &snapshot.tasks,
        weekly_letters: &snapshot.weekly_letters,
        reminders: &snapshot.reminders,
        widgets: &snapshot.widgets,
    }
}
