//! Meebook weekly plan (widget `0004`).

use std::collections::HashMap;

use async_trait::async_trait;
use aula_core::{first_name, WeekLabel};
use aula_fetch::WidgetAuth;
use serde_json::Value;
use tracing::{debug, instrument};

use super::digest::{escape_numbered, Digest, EMPTY_DAY, NO_SUBJECT_PILL};
use super::{ids, str_field, WeeklySource, WeeklyUpdate, WidgetRequest};
use crate::error::WidgetError;

fn render_week_plan(days: &[Value]) -> String {
    let mut digest = Digest::new();
    for day in days {
        digest.heading(str_field(day, "date"));
        let tasks = day
            .get("tasks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if tasks.is_empty() {
            digest.text(EMPTY_DAY);
            continue;
        }
        for task in tasks {
            let pill = str_field(task, "pill");
            if pill != NO_SUBJECT_PILL {
                digest.bold_line(pill);
            }
            digest
                .paragraph(str_field(task, "author"))
                .paragraph(&escape_numbered(str_field(task, "content")));
        }
    }
    digest.finish()
}

/// First name to weekly-plan digest from a `relatedweekplan/all` response.
///
/// # Errors
///
/// Returns an error when the response is not a list.
pub fn parse_meebook(response: &Value) -> Result<HashMap<String, String>, WidgetError> {
    let people = response
        .as_array()
        .ok_or_else(|| WidgetError::invalid(ids::MEEBOOK, "expected a list of people"))?;

    Ok(people
        .iter()
        .filter_map(|person| {
            let name = person.get("name")?.as_str()?;
            let days = person
                .get("weekPlan")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            debug!(name = first_name(name), days = days.len(), "Meebook week plan");
            Some((first_name(name).to_string(), render_week_plan(days)))
        })
        .collect())
}

/// Meebook weekly plan source. Results go to the weekly-letter map.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeebookSource;

#[async_trait]
impl WeeklySource for MeebookSource {
    fn widget_id(&self) -> &'static str {
        ids::MEEBOOK
    }

    fn name(&self) -> &'static str {
        "meebook"
    }

    #[instrument(skip(self, request, week), fields(week = %week))]
    async fn fetch_week(
        &self,
        request: &WidgetRequest<'_>,
        week: &WeekLabel,
    ) -> Result<WeeklyUpdate, WidgetError> {
        let mut query = vec![
            ("currentWeekNumber", week.to_string()),
            ("userProfile", "guardian".to_string()),
        ];
        query.extend(
            request
                .context
                .child_user_ids()
                .into_iter()
                .map(|id| ("childFilter[]", id)),
        );
        query.extend(
            request
                .context
                .institution_codes()
                .into_iter()
                .map(|code| ("institutionFilter[]", code)),
        );

        let url = format!("{}/relatedweekplan/all", request.endpoints.meebook);
        let response = request
            .http
            .get_json(
                &url,
                &query,
                &WidgetAuth::Authorization(request.token.to_string()),
                &[
                    ("accept", "application/json"),
                    ("origin", "https://www.aula.dk"),
                    ("referer", "https://www.aula.dk/"),
                    ("sessionuuid", request.username),
                    ("x-version", "1.0"),
                ],
            )
            .await?;

        Ok(WeeklyUpdate::Letters(parse_meebook(&response)?))
    }
}
