//! Profile context and session liveness.

use aula_core::InstitutionContext;
use aula_fetch::{FetchError, PortalSession};
use serde_json::Value;
use tracing::{debug, instrument};

use super::methods;

/// Loads the guardian profile context.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status or an envelope
/// without a usable `data` object.
#[instrument(skip(session))]
pub async fn fetch_profile_context(session: &PortalSession) -> Result<InstitutionContext, FetchError> {
    let url = session.api().method_url(methods::PROFILE_CONTEXT_GUARDIAN);
    let envelope = session
        .api_get(methods::PROFILE_CONTEXT_GUARDIAN)
        .await?
        .ensure_success(&url)?
        .envelope()?;
    let context: InstitutionContext = serde_json::from_value(envelope.data)?;
    debug!(
        institutions = context.institutions.len(),
        codes = ?context.institution_codes(),
        "Profile context loaded"
    );
    Ok(context)
}

/// Loads the profile context that carries the widget configuration.
///
/// Returns the envelope's `data` object.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status or a body that
/// is not JSON.
#[instrument(skip(session))]
pub async fn fetch_widget_config(session: &PortalSession) -> Result<Value, FetchError> {
    let url = session.api().method_url(methods::PROFILE_CONTEXT);
    let envelope = session
        .api_get(methods::PROFILE_CONTEXT)
        .await?
        .ensure_success(&url)?
        .envelope()?;
    Ok(envelope.data)
}

/// Returns true when the portal still accepts the session.
///
/// Any failure, including a transport error, counts as not alive.
#[instrument(skip(session))]
pub async fn is_session_alive(session: &PortalSession) -> bool {
    match session.api_get(methods::PROFILES_BY_LOGIN).await {
        Ok(response) => match response.envelope() {
            Ok(envelope) => {
                debug!(message = %envelope.status.message, "Liveness probe");
                envelope.is_ok()
            }
            Err(e) => {
                debug!(error = %e, "Liveness probe returned no envelope");
                false
            }
        },
        Err(e) => {
            debug!(error = %e, "Liveness probe failed");
            false
        }
    }
}
