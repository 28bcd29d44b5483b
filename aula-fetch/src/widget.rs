//! HTTP client for widget provider back-ends.
//!
//! Widget back-ends authenticate with a short-lived token minted by the
//! portal, not with session cookies, and each names its auth header
//! differently. Every call is bounded by a timeout.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{FetchError, HttpError};

/// Default timeout for widget provider calls.
pub const DEFAULT_WIDGET_TIMEOUT: Duration = Duration::from_secs(20);

/// How a widget back-end wants its token.
#[derive(Clone, PartialEq, Eq)]
pub enum WidgetAuth {
    /// Standard `Authorization` header.
    Authorization(String),
    /// Custom `Aula-Authorization` header.
    AulaAuthorization(String),
    /// No auth header.
    None,
}

impl WidgetAuth {
    fn header(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::Authorization(token) => Some(("Authorization", token)),
            Self::AulaAuthorization(token) => Some(("Aula-Authorization", token)),
            Self::None => None,
        }
    }
}

impl std::fmt::Debug for WidgetAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorization(_) => f.write_str("Authorization([REDACTED])"),
            Self::AulaAuthorization(_) => f.write_str("AulaAuthorization([REDACTED])"),
            Self::None => f.write_str("None"),
        }
    }
}

/// Cookie-less client for widget back-ends.
#[derive(Debug, Clone)]
pub struct WidgetHttp {
    inner: Client,
}

impl WidgetHttp {
    /// Creates a client with [`DEFAULT_WIDGET_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_WIDGET_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self { inner })
    }

    /// GETs a JSON document.
    ///
    /// `query` pairs are appended in order, so repeated keys stay repeated.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or a body
    /// that is not JSON.
    #[instrument(skip(self, query, auth, headers), fields(url = %url))]
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        auth: &WidgetAuth,
        headers: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        let mut request = self.inner.get(url).query(query);
        if let Some((name, value)) = auth.header() {
            request = request.header(name, value);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%status, "Widget response");
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_debug_redacts_token() {
        let auth = WidgetAuth::Authorization("Bearer secret".to_string());
        assert!(!format!("{auth:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_auth_header_and_repeated_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reminders/v1"))
            .and(header("Aula-Authorization", "Bearer t"))
            .and(header("zone", "Europe/Copenhagen"))
            .and(query_param("children", "a"))
            .and(query_param("children", "b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let http = WidgetHttp::new().unwrap();
        let value = http
            .get_json(
                &format!("{}/reminders/v1", server.uri()),
                &[("children", "a".to_string()), ("children", "b".to_string())],
                &WidgetAuth::AulaAuthorization("Bearer t".to_string()),
                &[("zone", "Europe/Copenhagen")],
            )
            .await
            .unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let http = WidgetHttp::new().unwrap();
        let err = http
            .get_json(&server.uri(), &[], &WidgetAuth::None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let http = WidgetHttp::new().unwrap();
        let err = http
            .get_json(&server.uri(), &[], &WidgetAuth::None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
