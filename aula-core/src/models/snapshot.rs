//! The aggregate a refresh cycle populates.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::institution::InstitutionContext;
use super::message::MessageDigest;
use super::presence::Presence;
use super::weekly::{WeekPair, WeekTasks};

/// Everything collaborators read after a refresh.
///
/// Presence is keyed by child id. Weekly maps are keyed by first name because
/// that is how the widget providers key their output; use
/// [`AulaSnapshot::first_name_of`] to go from a child id to that key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AulaSnapshot {
    /// Institutions and children from the latest profile context.
    pub context: InstitutionContext,
    /// Child id to presence.
    pub presence: HashMap<String, Presence>,
    /// Unread messages.
    pub messages: MessageDigest,
    /// Task-list buckets per first name.
    pub tasks: WeekPair<HashMap<String, WeekTasks>>,
    /// Weekly letters and weekly-plan digests per first name.
    pub weekly_letters: WeekPair<HashMap<String, String>>,
    /// Reminder digests per first name.
    pub reminders: HashMap<String, String>,
    /// Discovered widgets, id to name.
    pub widgets: BTreeMap<String, String>,
    /// When the cycle that produced this snapshot finished.
    pub updated_at: Option<DateTime<Utc>>,
}

impl AulaSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// First-name key for a child id.
    pub fn first_name_of(&self, child_id: &str) -> Option<&str> {
        self.context.child(child_id).map(super::Child::first_name)
    }

    /// Presence for a child, if the child was seen this cycle.
    pub fn presence_of(&self, child_id: &str) -> Option<&Presence> {
        self.presence.get(child_id)
    }

    /// Task buckets for a child in one week.
    pub fn tasks_of(&self, child_id: &str, slot: super::WeekSlot) -> Option<&WeekTasks> {
        let name = self.first_name_of(child_id)?;
        self.tasks.get(slot).get(name)
    }

    /// Weekly letter or plan digest for a child in one week.
    pub fn weekly_letter_of(&self, child_id: &str, slot: super::WeekSlot) -> Option<&str> {
        let name = self.first_name_of(child_id)?;
        self.weekly_letters.get(slot).get(name).map(String::as_str)
    }

    /// Reminder digest for a child.
    pub fn reminders_of(&self, child_id: &str) -> Option<&str> {
        let name = self.first_name_of(child_id)?;
        self.reminders.get(name).map(String::as_str)
    }

    /// Returns true if a widget was discovered.
    pub fn has_widget(&self, widget_id: &str) -> bool {
        self.widgets.contains_key(widget_id)
    }
}
