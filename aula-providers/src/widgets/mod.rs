//! Widget back-ends: token broker and weekly-plan sources.
//!
//! Widgets are optional modules enabled per institution. Each has its own
//! back-end, authenticated with a short-lived token minted by the portal.
//!
//! | Id | Back-end | Produces |
//! |----|----------|----------|
//! | `0030` | MinUddannelse task list | per-child, per-weekday tasks |
//! | `0029` | MinUddannelse weekly letter | per-child letter |
//! | `0004` | Meebook weekly plan | per-child letter digest |
//! | `0062` | Systematic reminders | per-child reminder digest |

mod broker;
pub mod digest;
mod letters;
mod meebook;
mod reminders;
mod tasks;

use std::collections::HashMap;

use async_trait::async_trait;
use aula_core::{InstitutionContext, WeekLabel, WeekTasks};
use aula_fetch::{Endpoints, WidgetHttp};

use crate::error::WidgetError;

pub use broker::WidgetBroker;
pub use letters::{parse_weekly_letters, WeeklyLetterSource};
pub use meebook::{parse_meebook, MeebookSource};
pub use reminders::{fetch_reminders, parse_reminders, REMINDER_HORIZON_DAYS};
pub use tasks::{format_due_date, parse_tasks, TaskListSource};

/// Known widget ids.
pub mod ids {
    /// MinUddannelse task list.
    pub const TASK_LIST: &str = "0030";
    /// MinUddannelse weekly letter.
    pub const WEEKLY_LETTER: &str = "0029";
    /// Systematic reminders ("Huskelisten").
    pub const REMINDERS: &str = "0062";
    /// Meebook weekly plan.
    pub const MEEBOOK: &str = "0004";
}

/// Everything a widget call needs besides the week.
#[derive(Debug, Clone, Copy)]
pub struct WidgetRequest<'a> {
    /// Widget HTTP client.
    pub http: &'a WidgetHttp,
    /// Back-end base URLs.
    pub endpoints: &'a Endpoints,
    /// Current profile context.
    pub context: &'a InstitutionContext,
    /// UNI-login username, used as a session id by some back-ends.
    pub username: &'a str,
    /// `Bearer ...` token for this widget.
    pub token: &'a str,
}

impl WidgetRequest<'_> {
    pub(crate) fn guardian_id(&self, widget: &str) -> Result<&str, WidgetError> {
        self.context
            .guardian_user_id
            .as_deref()
            .ok_or_else(|| WidgetError::invalid(widget, "profile context has no guardian user id"))
    }
}

/// One week's result from a weekly source.
#[derive(Debug, Clone, PartialEq)]
pub enum WeeklyUpdate {
    /// Replaces the week's task map.
    Tasks(HashMap<String, WeekTasks>),
    /// Merged into the week's letter map.
    Letters(HashMap<String, String>),
}

/// A widget back-end queried once per week slot.
#[async_trait]
pub trait WeeklySource: Send + Sync {
    /// Widget id that enables this source.
    fn widget_id(&self) -> &'static str;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fetches one ISO week.
    async fn fetch_week(
        &self,
        request: &WidgetRequest<'_>,
        week: &WeekLabel,
    ) -> Result<WeeklyUpdate, WidgetError>;
}

/// String field of a JSON object, empty when missing or not a string.
pub(crate) fn str_field<'a>(value: &'a serde_json::Value, key: &str) -> &'a str {
    value.get(key).and_then(serde_json::Value::as_str).unwrap_or_default()
}

/// Task list, weekly letter and Meebook, in that order.
pub fn default_sources() -> Vec<Box<dyn WeeklySource>> {
    vec![
        Box::new(TaskListSource),
        Box::new(WeeklyLetterSource),
        Box::new(MeebookSource),
    ]
}
