//! API version discovery.

use aula_fetch::PortalSession;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::AuthError;
use crate::portal::methods;

/// Probes API versions upwards from the session's current one.
///
/// 410 means the version is retired and the next one is tried, 403 means
/// the account was refused, 200 pins the session to that version and
/// returns `data.profiles`. At most `max_bumps` retired versions are
/// skipped.
///
/// # Errors
///
/// Returns [`AuthError::AccessDenied`] on 403,
/// [`AuthError::VersionExhausted`] when every probed version was retired and
/// [`AuthError::UnexpectedStatus`] for any other status.
#[instrument(skip(session), fields(first = session.api().version))]
pub async fn discover_api_version(
    session: &mut PortalSession,
    max_bumps: u32,
) -> Result<Value, AuthError> {
    let first = session.api().version;
    let last = first.saturating_add(max_bumps);

    for version in first..=last {
        session.set_api_version(version);
        let response = session.api_get(methods::PROFILES_BY_LOGIN).await?;

        match response.status {
            StatusCode::GONE => {
                info!(version, "API version retired, trying the next one");
            }
            StatusCode::FORBIDDEN => {
                warn!(version, "Portal refused the account");
                return Err(AuthError::AccessDenied);
            }
            StatusCode::OK => {
                let envelope = response.envelope()?;
                let profiles = envelope.data.get("profiles").cloned().ok_or_else(|| {
                    AuthError::InvalidResponse("version probe returned no profiles".to_string())
                })?;
                debug!(version, "API version accepted");
                return Ok(profiles);
            }
            other => {
                return Err(AuthError::UnexpectedStatus {
                    status: other.as_u16(),
                    version,
                });
            }
        }
    }

    Err(AuthError::VersionExhausted { first, last })
}
