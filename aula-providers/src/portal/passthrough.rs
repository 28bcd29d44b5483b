//! Ad-hoc portal calls outside the pipeline.

use aula_fetch::PortalSession;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::error::ProviderError;

/// Result text returned for a body that is not JSON.
pub const INVALID_POST_DATA: &str = "Fail - invalid json supplied as post_data";

/// Calls `<api url><uri>` and returns the decoded reply.
///
/// Without `post_data` the call is a GET, otherwise the data is parsed and
/// POSTed as JSON with the CSRF header. Invalid `post_data` is reported as
/// `{"result": INVALID_POST_DATA}` without calling upstream, and a reply
/// that is not JSON comes back as `{"raw_response": <body>}`.
///
/// # Errors
///
/// Returns an error on transport failure.
#[instrument(skip(session, post_data), fields(has_body = post_data.is_some()))]
pub async fn api_call(
    session: &PortalSession,
    uri: &str,
    post_data: Option<&str>,
) -> Result<Value, ProviderError> {
    let body = match post_data {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Refusing invalid post data");
                return Ok(json!({ "result": INVALID_POST_DATA }));
            }
        },
        None => None,
    };

    let response = session.call(uri, body.as_ref()).await?;
    Ok(response.json_or_raw())
}
