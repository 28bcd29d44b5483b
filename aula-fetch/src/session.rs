//! Cookie-bearing session against the identity broker and the portal API.
//!
//! One [`PortalSession`] carries the SSO cookies (including the CSRF cookie)
//! from the first broker page through every portal call. It is replaced, not
//! repaired, when the portal stops accepting it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::envelope::ApiEnvelope;
use crate::error::{FetchError, HttpError};

/// Default timeout for portal and broker calls.
pub const DEFAULT_PORTAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Desktop browser identity the broker expects.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/112.0";

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const ACCEPT_LANGUAGE: &str = "da,en-US;q=0.7,en;q=0.3";

/// Cookie holding the CSRF token.
pub const CSRF_COOKIE: &str = "Csrfp-Token";

/// Header the portal expects the CSRF token in.
pub const CSRF_HEADER: &str = "csrfp-token";

// ============================================================================
// API Location
// ============================================================================

/// Portal API prefix plus the version currently in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLocation {
    /// Prefix such as `https://www.aula.dk/api/v`.
    pub base: String,
    /// Numeric API version.
    pub version: u32,
}

impl ApiLocation {
    /// Creates a location.
    pub fn new(base: impl Into<String>, version: u32) -> Self {
        Self {
            base: base.into(),
            version,
        }
    }

    /// Versioned API URL, e.g. `https://www.aula.dk/api/v19`.
    pub fn url(&self) -> String {
        format!("{}{}", self.base, self.version)
    }

    /// URL for a portal method plus its query parameters.
    pub fn method_url(&self, method_and_query: &str) -> String {
        format!("{}?method={method_and_query}", self.url())
    }
}

// ============================================================================
// Responses
// ============================================================================

/// An HTML page reached after redirects.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status.
    pub status: StatusCode,
    /// Body text.
    pub body: String,
}

/// A buffered portal API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Body text.
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decodes the portal envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object.
    pub fn envelope(&self) -> Result<ApiEnvelope, FetchError> {
        self.json()
    }

    /// Decoded JSON, or `{"raw_response": body}` when the body is not JSON.
    pub fn json_or_raw(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| json!({ "raw_response": self.body }))
    }

    /// Fails unless the status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] for a non-success status.
    pub fn ensure_success(self, url: &str) -> Result<Self, FetchError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status {
                status: self.status.as_u16(),
                url: strip_query(url),
            })
        }
    }
}

fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

// ============================================================================
// Portal Session
// ============================================================================

/// One authenticated (or authenticating) browser-like session.
#[derive(Debug, Clone)]
pub struct PortalSession {
    client: Client,
    jar: Arc<Jar>,
    api: ApiLocation,
}

impl PortalSession {
    /// Creates a fresh session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api: ApiLocation, timeout: Duration) -> Result<Self, HttpError> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(header::DNT, HeaderValue::from_static("1"));

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client, jar, api })
    }

    /// Current API location.
    pub fn api(&self) -> &ApiLocation {
        &self.api
    }

    /// Switches to another API version.
    pub fn set_api_version(&mut self, version: u32) {
        self.api.version = version;
    }

    /// The cookie jar shared with the client.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    // ------------------------------------------------------------------------
    // Broker pages
    // ------------------------------------------------------------------------

    /// Loads an HTML page, following redirects.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    #[instrument(skip(self), fields(url = %strip_query(url)))]
    pub async fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, HTML_ACCEPT)
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;
        read_page(response).await
    }

    /// Posts an urlencoded form, following redirects.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    #[instrument(skip(self, fields), fields(url = %strip_query(url.as_str())))]
    pub async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<Page, FetchError> {
        let response = self
            .client
            .post(url.clone())
            .header(header::ACCEPT, HTML_ACCEPT)
            .header("Upgrade-Insecure-Requests", "1")
            .form(fields)
            .send()
            .await?;
        read_page(response).await
    }

    // ------------------------------------------------------------------------
    // Portal API
    // ------------------------------------------------------------------------

    /// CSRF token from the session cookies, if the portal has set one.
    pub fn csrf_token(&self) -> Option<String> {
        let url = Url::parse(&self.api.url()).ok()?;
        let cookies = self.jar.cookies(&url)?;
        cookies
            .to_str()
            .ok()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == CSRF_COOKIE)
            .map(|(_, value)| value.to_string())
    }

    /// Calls a portal method with GET. Any status is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    #[instrument(skip(self), fields(version = self.api.version))]
    pub async fn api_get(&self, method_and_query: &str) -> Result<ApiResponse, FetchError> {
        let url = self.api.method_url(method_and_query);
        let response = self.client.get(&url).send().await?;
        read_api(response).await
    }

    /// Calls a portal method with a JSON POST body and the CSRF header.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingCsrfToken`] without a CSRF cookie, or an
    /// error on transport failure.
    #[instrument(skip(self, body), fields(version = self.api.version))]
    pub async fn api_post(
        &self,
        method_and_query: &str,
        body: &Value,
    ) -> Result<ApiResponse, FetchError> {
        let token = self.csrf_token().ok_or(FetchError::MissingCsrfToken)?;
        let url = self.api.method_url(method_and_query);
        let response = self
            .client
            .post(&url)
            .header(CSRF_HEADER, token)
            .json(body)
            .send()
            .await?;
        read_api(response).await
    }

    /// Raw call against the versioned API URL with `uri` appended.
    ///
    /// GET without a body, POST with one. The CSRF header is sent whenever
    /// the session has a token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    #[instrument(skip(self, body), fields(has_body = body.is_some()))]
    pub async fn call(&self, uri: &str, body: Option<&Value>) -> Result<ApiResponse, FetchError> {
        let url = format!("{}{uri}", self.api.url());
        let mut request = match body {
            Some(body) => self.client.post(&url).json(body),
            None => self.client.get(&url),
        };
        if let Some(token) = self.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        let response = request.send().await?;
        read_api(response).await
    }
}

async fn read_page(response: reqwest::Response) -> Result<Page, FetchError> {
    let url = response.url().clone();
    let status = response.status();
    let body = response.text().await?;
    debug!(%status, final_url = %strip_query(url.as_str()), "Page loaded");
    Ok(Page { url, status, body })
}

async fn read_api(response: reqwest::Response) -> Result<ApiResponse, FetchError> {
    let status = response.status();
    let body = response.text().await?;
    debug!(%status, bytes = body.len(), "API response");
    Ok(ApiResponse { status, body })
}
