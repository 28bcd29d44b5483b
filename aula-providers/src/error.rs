//! Provider and client error types.

use aula_fetch::{FetchError, HttpError};
use thiserror::Error;

/// Message shown when the portal refuses the account.
pub const ACCESS_DENIED_MESSAGE: &str = "Access to Aula API was denied. Please check that you \
     have entered the correct credentials. (Your password automatically expires on regular \
     intervals!)";

// ============================================================================
// Auth Error
// ============================================================================

/// Errors from the login flow and API version discovery.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The portal answered 403 to the version probe.
    #[error("{ACCESS_DENIED_MESSAGE}")]
    AccessDenied,

    /// The SSO redirect chain did not reach the portal.
    #[error("Login did not reach the portal after {attempts} form submissions")]
    RedirectLimit {
        /// Form submissions made.
        attempts: usize,
    },

    /// Every probed API version was retired.
    #[error("No usable API version between v{first} and v{last}")]
    VersionExhausted {
        /// First version probed.
        first: u32,
        /// Last version probed.
        last: u32,
    },

    /// The version probe returned a status other than 200, 403 or 410.
    #[error("API version probe for v{version} returned HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status.
        status: u16,
        /// Version probed.
        version: u32,
    },

    /// No username or password configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// A login response did not have the expected shape.
    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        Self::Fetch(FetchError::Http(err))
    }
}

impl AuthError {
    /// Returns true if retrying with the same credentials cannot help.
    ///
    /// Fatal errors block further refreshes until credentials change.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied
                | Self::RedirectLimit { .. }
                | Self::VersionExhausted { .. }
                | Self::MissingCredentials(_)
        )
    }
}

// ============================================================================
// Widget Error
// ============================================================================

/// Errors from widget discovery, token minting and widget back-ends.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The widget is not enabled for this account.
    #[error("Widget {0} is not available")]
    NotAvailable(String),

    /// The portal did not return a token.
    #[error("No token returned for widget {0}")]
    NoToken(String),

    /// The back-end response had an unexpected shape.
    #[error("Unexpected response from {widget}: {reason}")]
    InvalidResponse {
        /// Widget id.
        widget: String,
        /// What was wrong.
        reason: String,
    },

    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl WidgetError {
    pub(crate) fn invalid(widget: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            widget: widget.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Provider Error
// ============================================================================

/// Errors from a single pipeline stage.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Model construction failed.
    #[error("Core error: {0}")]
    Core(#[from] aula_core::CoreError),

    /// Persisting a stage result failed.
    #[error("Store error: {0}")]
    Store(#[from] aula_store::StoreError),

    /// Widget failure.
    #[error(transparent)]
    Widget(#[from] WidgetError),

    /// The response had an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Fetch(FetchError::Json(err))
    }
}

// ============================================================================
// Client Error
// ============================================================================

/// Errors surfaced by [`crate::AulaClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An earlier fatal login error blocks the client until credentials change.
    #[error("Login blocked until credentials change: {0}")]
    Blocked(String),

    /// The client could not be set up.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Transport failure outside the pipeline stages.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A passthrough call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ClientError {
    /// Returns true when the caller should stop scheduling refreshes.
    pub fn is_blocking(&self) -> bool {
        match self {
            Self::Blocked(_) => true,
            Self::Auth(e) => e.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AuthError::AccessDenied.is_fatal());
        assert!(AuthError::RedirectLimit { attempts: 10 }.is_fatal());
        assert!(AuthError::VersionExhausted { first: 19, last: 29 }.is_fatal());
        assert!(!AuthError::UnexpectedStatus { status: 502, version: 19 }.is_fatal());
        assert!(!AuthError::Fetch(FetchError::MissingCsrfToken).is_fatal());
    }

    #[test]
    fn test_access_denied_message_is_for_end_users() {
        let msg = AuthError::AccessDenied.to_string();
        assert!(msg.starts_with("Access to Aula API was denied."));
        assert!(msg.contains("correct credentials"));
    }

    #[test]
    fn test_client_blocking() {
        assert!(ClientError::Blocked("x".into()).is_blocking());
        assert!(ClientError::Auth(AuthError::AccessDenied).is_blocking());
        assert!(!ClientError::Fetch(FetchError::MissingCsrfToken).is_blocking());
    }
}
