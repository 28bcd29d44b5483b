//! Systematic reminders, "Huskelisten" (widget `0062`).

use std::collections::HashMap;

use aula_core::first_name;
use aula_fetch::WidgetAuth;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, instrument};

use super::digest::{escape_numbered, no_reminders, reminder_heading, Digest};
use super::{ids, str_field, WidgetRequest};
use crate::error::WidgetError;

/// Reminders due later than this many days ahead are not requested.
pub const REMINDER_HORIZON_DAYS: i64 = 180;

const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn render_reminders(name: &str, reminders: &[Value]) -> String {
    if reminders.is_empty() {
        return no_reminders(name);
    }

    let mut digest = Digest::new();
    for reminder in reminders {
        let due = str_field(reminder, "dueDate");
        if let Ok(due) = NaiveDateTime::parse_from_str(due, DUE_DATE_FORMAT) {
            digest.heading(&reminder_heading(due));
        }
        digest
            .bold_line(str_field(reminder, "subjectName"))
            .paragraph(&format!("af {}", str_field(reminder, "createdBy")))
            .paragraph(&escape_numbered(str_field(reminder, "reminderText")));
    }
    digest.finish()
}

/// First name to reminder digest from a `reminders/v1` response.
///
/// Only team reminders are shown. A person without any gets a fixed
/// "no reminders" text instead of an empty string.
///
/// # Errors
///
/// Returns an error when the response is not a list.
pub fn parse_reminders(response: &Value) -> Result<HashMap<String, String>, WidgetError> {
    let people = response
        .as_array()
        .ok_or_else(|| WidgetError::invalid(ids::REMINDERS, "expected a list of people"))?;

    Ok(people
        .iter()
        .filter_map(|person| {
            let name = first_name(person.get("userName")?.as_str()?);
            let reminders = person
                .get("teamReminders")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            debug!(name, reminders = reminders.len(), "Reminders");
            Some((name.to_string(), render_reminders(name, reminders)))
        })
        .collect())
}

/// Fetches reminders due from `today` up to [`REMINDER_HORIZON_DAYS`] ahead.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status or a body that
/// is not a list.
#[instrument(skip(request))]
pub async fn fetch_reminders(
    request: &WidgetRequest<'_>,
    today: NaiveDate,
) -> Result<HashMap<String, String>, WidgetError> {
    let until = today + Duration::days(REMINDER_HORIZON_DAYS);

    let mut query: Vec<(&str, String)> = request
        .context
        .child_user_ids()
        .into_iter()
        .map(|id| ("children", id))
        .collect();
    query.extend([
        ("from", today.format("%Y-%m-%d").to_string()),
        ("dueNoLaterThan", until.format("%Y-%m-%d").to_string()),
        ("widgetVersion", "1.10".to_string()),
        ("userProfile", "guardian".to_string()),
        ("sessionId", request.username.to_string()),
    ]);
    query.extend(
        request
            .context
            .institution_codes()
            .into_iter()
            .map(|code| ("institutions", code)),
    );

    let url = format!("{}/reminders/v1", request.endpoints.systematic);
    let response = request
        .http
        .get_json(
            &url,
            &query,
            &WidgetAuth::AulaAuthorization(request.token.to_string()),
            &[
                ("Accept", "application/json, text/plain, */*"),
                ("Origin", "https://www.aula.dk"),
                ("Referer", "https://www.aula.dk/"),
                ("zone", "Europe/Copenhagen"),
            ],
        )
        .await?;

    parse_reminders(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reminders() {
        let response = json!([
            {"userName": "Karla Hansen", "teamReminders": [{
                "dueDate": "2022-11-30T23:00:00Z",
                "subjectName": "Dansk",
                "createdBy": "Christina",
                "reminderText": "Læs kap. 1 og 2. afsnit"
            }]},
            {"userName": "Vega  ", "teamReminders": []}
        ]);
        let reminders = parse_reminders(&response).unwrap();
        assert_eq!(
            reminders["Karla"],
            "<h3>Wednesday 30. November</h3><b>Dansk</b><br>af Christina<br><br>\
             Læs kap. 1 og 2\\. afsnit<br><br>"
        );
        assert_eq!(reminders["Vega"], "Vega har ingen påmindelser.");
    }

    #[test]
    fn test_missing_team_reminders_counts_as_none() {
        let reminders = parse_reminders(&json!([{"userName": "Emilie"}])).unwrap();
        assert_eq!(reminders["Emilie"], "Emilie har ingen påmindelser.");
    }

    #[test]
    fn test_not_a_list_is_an_error() {
        assert!(parse_reminders(&json!({})).is_err());
    }
}
