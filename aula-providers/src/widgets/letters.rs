//! MinUddannelse weekly letter (widget `0029`).

use std::collections::HashMap;

use async_trait::async_trait;
use aula_core::{first_name, WeekLabel};
use aula_fetch::WidgetAuth;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ids, WeeklySource, WeeklyUpdate, WidgetRequest};
use crate::error::WidgetError;

/// First name to letter HTML from an `ugebrev` response.
///
/// The letter is the first letter of the person's first institution,
/// stored verbatim. People without one are skipped.
///
/// # Errors
///
/// Returns an error when the response has no `personer` list.
pub fn parse_weekly_letters(response: &Value) -> Result<HashMap<String, String>, WidgetError> {
    let people = response
        .get("personer")
        .and_then(Value::as_array)
        .ok_or_else(|| WidgetError::invalid(ids::WEEKLY_LETTER, "missing personer"))?;

    Ok(people
        .iter()
        .filter_map(|person| {
            let name = person.get("navn")?.as_str()?;
            let letter = person
                .pointer("/institutioner/0/ugebreve/0/indhold")
                .and_then(Value::as_str);
            if letter.is_none() {
                debug!(name = first_name(name), "No weekly letter");
            }
            Some((first_name(name).to_string(), letter?.to_string()))
        })
        .collect())
}

/// Weekly letter source.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyLetterSource;

#[async_trait]
impl WeeklySource for WeeklyLetterSource {
    fn widget_id(&self) -> &'static str {
        ids::WEEKLY_LETTER
    }

    fn name(&self) -> &'static str {
        "ugebrev"
    }

    #[instrument(skip(self, request, week), fields(week = %week))]
    async fn fetch_week(
        &self,
        request: &WidgetRequest<'_>,
        week: &WeekLabel,
    ) -> Result<WeeklyUpdate, WidgetError> {
        let guardian = request.guardian_id(ids::WEEKLY_LETTER)?;
        let query = [
            ("assuranceLevel", "2".to_string()),
            ("childFilter", request.context.child_user_ids().join(",")),
            ("currentWeekNumber", week.to_string()),
            ("isMobileApp", "false".to_string()),
            ("placement", "narrow".to_string()),
            ("sessionUUID", guardian.to_string()),
            ("userProfile", "guardian".to_string()),
        ];
        let url = format!("{}/ugebrev", request.endpoints.min_uddannelse);
        let response = request
            .http
            .get_json(
                &url,
                &query,
                &WidgetAuth::Authorization(request.token.to_string()),
                &[("accept", "application/json")],
            )
            .await?;

        Ok(WeeklyUpdate::Letters(parse_weekly_letters(&response)?))
    }
}
