//! MinUddannelse task list (widget `0030`).

use std::collections::HashMap;

use async_trait::async_trait;
use aula_core::{first_name, TaskEntry, WeekLabel, WeekTasks, Weekday};
use aula_fetch::WidgetAuth;
use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ids, str_field, WeeklySource, WeeklyUpdate, WidgetRequest};
use crate::error::WidgetError;

/// Formats the unix seconds embedded in `/Date(1700000000000+0100)/`.
///
/// The ten digits at offset 6 are read as seconds and rendered as
/// `dd-mm-YYYY HH:MM` in UTC. Returns `None` when they are not a timestamp.
pub fn format_due_date(raw: &str) -> Option<String> {
    let seconds: i64 = raw.get(6..16)?.parse().ok()?;
    let due = DateTime::from_timestamp(seconds, 0)?;
    Some(due.format("%d-%m-%Y %H:%M").to_string())
}

fn task_entry(task: &Value) -> TaskEntry {
    let raw_due = str_field(task, "afleveringsdato");
    TaskEntry {
        team: task
            .pointer("/hold/0/navn")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        title: str_field(task, "title").to_string(),
        done: task.get("erFaerdig").and_then(Value::as_bool).unwrap_or(false),
        task_type: str_field(task, "opgaveType").to_string(),
        due: format_due_date(raw_due).unwrap_or_else(|| raw_due.to_string()),
        week_number: task.get("ugenummer").cloned().unwrap_or(Value::Null),
    }
}

/// Buckets an `opgaveliste` response per child first name and weekday.
///
/// Every name in `first_names` gets five empty days before tasks are added,
/// so a child with no tasks this week still has a complete, empty entry.
/// Tasks without a recipient or with an unknown weekday are skipped.
///
/// # Errors
///
/// Returns an error when the response has no `opgaver` list.
pub fn parse_tasks(response: &Value, first_names: &[String]) -> Result<HashMap<String, WeekTasks>, WidgetError> {
    let tasks = response
        .get("opgaver")
        .and_then(Value::as_array)
        .ok_or_else(|| WidgetError::invalid(ids::TASK_LIST, "missing opgaver"))?;

    let mut buckets: HashMap<String, WeekTasks> = first_names
        .iter()
        .map(|name| (name.clone(), WeekTasks::new()))
        .collect();

    for task in tasks {
        let Some(recipient) = task.get("kuvertnavn").and_then(Value::as_str) else {
            debug!("Task without recipient skipped");
            continue;
        };
        let day_name = task.get("ugedag").and_then(Value::as_str).unwrap_or_default();
        let Some(day) = Weekday::from_danish(day_name) else {
            debug!(day = day_name, "Task on a non-school day skipped");
            continue;
        };
        buckets
            .entry(first_name(recipient).to_string())
            .or_default()
            .push(day, task_entry(task));
    }

    Ok(buckets)
}

/// Task list source.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListSource;

#[async_trait]
impl WeeklySource for TaskListSource {
    fn widget_id(&self) -> &'static str {
        ids::TASK_LIST
    }

    fn name(&self) -> &'static str {
        "opgaveliste"
    }

    #[instrument(skip(self, request, week), fields(week = %week))]
    async fn fetch_week(
        &self,
        request: &WidgetRequest<'_>,
        week: &WeekLabel,
    ) -> Result<WeeklyUpdate, WidgetError> {
        let guardian = request.guardian_id(ids::TASK_LIST)?;
        let query = [
            ("placement", "full".to_string()),
            ("sessionUUID", guardian.to_string()),
            ("userProfile", "guardian".to_string()),
            ("currentWeekNumber", week.to_string()),
            ("childFilter", request.context.child_user_ids().join(",")),
            ("isMobileApp", "false".to_string()),
            ("institutionFilter", request.context.institution_codes().join(",")),
        ];
        let url = format!("{}/opgaveliste", request.endpoints.min_uddannelse);
        let response = request
            .http
            .get_json(
                &url,
                &query,
                &WidgetAuth::Authorization(request.token.to_string()),
                &[("accept", "application/json")],
            )
            .await?;

        let tasks = parse_tasks(&response, &request.context.distinct_first_names())?;
        debug!(children = tasks.len(), "Task list parsed");
        Ok(WeeklyUpdate::Tasks(tasks))
    }
}
