//! Text output formatting with colors.

use std::collections::BTreeMap;

use aula_core::{AulaSnapshot, LessonEvent, Presence, PresenceStatus, WeekSlot};
use chrono::Local;
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a whole refresh result.
    pub fn format_snapshot(&self, snapshot: &AulaSnapshot) -> String {
        let mut lines = Vec::new();

        let updated = snapshot.updated_at.map_or_else(
            || "never".to_string(),
            |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
        );
        lines.push(format!("{} {}", self.bold("Aula"), self.dim(&format!("(updated {updated})"))));
        lines.push("─".repeat(50));

        // Children and presence
        if snapshot.context.is_empty() {
            lines.push(self.dim("No children found"));
        }
        for (institution, child) in snapshot.context.children() {
            let name = format!("{} {}", institution.name, child.first_name());
            let presence = snapshot
                .presence_of(&child.id)
                .map_or_else(|| self.dim("-"), |p| self.format_presence(p));
            lines.push(format!("{:<32} {}", name, presence));
            if let Some(times) = snapshot.presence_of(&child.id).and_then(presence_times) {
                lines.push(format!("{:<32} {}", "", self.dim(&times)));
            }
        }

        // Messages
        lines.push(String::new());
        let count = snapshot.messages.count();
        lines.push(self.bold(&format!(
            "{count} unread message{}",
            if count == 1 { "" } else { "s" }
        )));
        for message in snapshot.messages.messages() {
            let subject = if message.subject.is_empty() {
                "(no subject)"
            } else {
                message.subject.as_str()
            };
            let line = format!("  • {subject} - {}", message.sender);
            if message.is_sensitive() {
                lines.push(self.yellow(&line));
            } else {
                lines.push(line);
            }
        }

        // Weekly plans
        let weekly = self.format_weekly(snapshot);
        if !weekly.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Weekly plans"));
            lines.extend(weekly);
        }

        if !snapshot.widgets.is_empty() {
            lines.push(String::new());
            let widgets: Vec<String> = snapshot
                .widgets
                .iter()
                .map(|(id, name)| format!("{id} {name}"))
                .collect();
            lines.push(self.dim(&format!("Widgets: {}", widgets.join(", "))));
        }

        lines.join("\n")
    }

    /// Per-child weekly summary lines; empty when nothing was collected.
    fn format_weekly(&self, snapshot: &AulaSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        for name in snapshot.context.distinct_first_names() {
            let mut parts = Vec::new();
            for slot in WeekSlot::BOTH {
                let label = match slot {
                    WeekSlot::ThisWeek => "this week",
                    WeekSlot::NextWeek => "next week",
                };
                if let Some(tasks) = snapshot.tasks.get(slot).get(&name) {
                    parts.push(format!("{} tasks {label}", tasks.len()));
                }
                if snapshot.weekly_letters.get(slot).contains_key(&name) {
                    parts.push(format!("letter {label}"));
                }
            }
            if snapshot.reminders.contains_key(&name) {
                parts.push("reminders".to_string());
            }
            if !parts.is_empty() {
                lines.push(format!("  {:<12} {}", name, parts.join(", ")));
            }
        }
        lines
    }

    /// Formats a presence label with a color per status.
    pub fn format_presence(&self, presence: &Presence) -> String {
        let label = presence.label();
        match presence.record().map(|r| r.status) {
            None => self.dim(&label),
            Some(PresenceStatus::Present | PresenceStatus::FieldTrip) => self.green(&label),
            Some(PresenceStatus::Sick) => self.red(&label),
            Some(PresenceStatus::NotArrived | PresenceStatus::Left) => self.yellow(&label),
            Some(_) => self.cyan(&label),
        }
    }

    /// Formats lessons grouped per child.
    pub fn format_lessons(&self, lessons: &BTreeMap<String, Vec<LessonEvent>>) -> String {
        if lessons.is_empty() {
            return self.dim("No lessons in the calendar file");
        }

        let mut lines = Vec::new();
        for (child, events) in lessons {
            lines.push(self.bold(child));
            if events.is_empty() {
                lines.push(format!("  {}", self.dim("No lessons")));
            }
            for event in events {
                lines.push(format!(
                    "  {} {}-{}  {}",
                    event.start.format("%a %d/%m"),
                    event.start.format("%H:%M"),
                    event.end.format("%H:%M"),
                    event.summary
                ));
            }
            lines.push(String::new());
        }
        lines.pop();
        lines.join("\n")
    }

    /// Formats an error message.
    pub fn format_error(&self, error: &str) -> String {
        format!("{} - {}", self.red("Error"), error)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// `"in 08:05, out 15:00"` from the display attributes, when either is set.
fn presence_times(presence: &Presence) -> Option<String> {
    let attrs = presence.record()?.attributes();
    let time = |key: &str| attrs.get(key).and_then(Value::as_str).map(str::to_string);

    let parts: Vec<String> = [("in", time("entryTime")), ("out", time("exitTime"))]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label} {v}")))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
