//! Calendar events for the schedule side file.

use aula_core::InstitutionContext;
use aula_fetch::PortalSession;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::methods;
use crate::error::ProviderError;

/// Days covered by one calendar query, counted from today.
pub const CALENDAR_WINDOW_DAYS: i64 = 14;

const CALENDAR_TIME_FORMAT: &str = "%Y-%m-%d 00:00:00.0000%z";

/// Request body for the calendar window starting today (UTC).
///
/// Child ids are sent as numbers where they parse as such.
pub fn calendar_query(context: &InstitutionContext, now: DateTime<Utc>) -> Value {
    let ids: Vec<Value> = context
        .child_ids()
        .into_iter()
        .map(|id| id.parse::<i64>().map_or(Value::String(id), Value::from))
        .collect();
    let end = now + Duration::days(CALENDAR_WINDOW_DAYS);

    json!({
        "instProfileIds": ids,
        "resourceIds": [],
        "start": now.format(CALENDAR_TIME_FORMAT).to_string(),
        "end": end.format(CALENDAR_TIME_FORMAT).to_string(),
    })
}

/// Fetches the raw calendar response body for every child.
///
/// # Errors
///
/// Returns an error without a CSRF token, on transport failure or on a
/// non-2xx status.
#[instrument(skip(session, context))]
pub async fn fetch_calendar(
    session: &PortalSession,
    context: &InstitutionContext,
    now: DateTime<Utc>,
) -> Result<String, ProviderError> {
    let query = calendar_query(context, now);
    let url = session.api().method_url(methods::CALENDAR_EVENTS);
    let response = session
        .api_post(methods::CALENDAR_EVENTS, &query)
        .await?
        .ensure_success(&url)?;
    debug!(bytes = response.body.len(), "Calendar fetched");
    Ok(response.body)
}
