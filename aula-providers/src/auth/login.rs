//! Identity broker login.

use std::time::Duration;

use aula_core::InstitutionContext;
use aula_fetch::session::DEFAULT_PORTAL_TIMEOUT;
use aula_fetch::{ApiLocation, Endpoints, FetchError, HtmlForm, Page, PortalSession};
use aula_store::settings_store::{DEFAULT_API_VERSION, DEFAULT_MAX_API_VERSION_BUMPS};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use super::credentials::Credentials;
use super::version::discover_api_version;
use crate::error::AuthError;
use crate::portal::fetch_profile_context;

/// Maximum form submissions after the identity provider selection.
pub const MAX_LOGIN_REDIRECTS: usize = 10;

/// Identity provider selector value for UNI-login.
pub const IDP_SELECTOR: &str = "uni_idp";

/// Account type submitted with the credentials.
const ACCOUNT_TYPE: &str = "KONTAKT";

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    /// Authenticated session pinned to the discovered API version.
    pub session: PortalSession,
    /// `data.profiles` from the accepted version probe.
    pub profiles: Value,
    /// Guardian profile context.
    pub context: InstitutionContext,
}

/// Drives the login sequence.
#[derive(Debug, Clone)]
pub struct Authenticator {
    endpoints: Endpoints,
    start_version: u32,
    max_bumps: u32,
    timeout: Duration,
}

impl Authenticator {
    /// Creates an authenticator with default version and timeout settings.
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            start_version: DEFAULT_API_VERSION,
            max_bumps: DEFAULT_MAX_API_VERSION_BUMPS,
            timeout: DEFAULT_PORTAL_TIMEOUT,
        }
    }

    /// Sets the first API version to probe.
    #[must_use]
    pub fn with_api_version(mut self, version: u32) -> Self {
        self.start_version = version;
        self
    }

    /// Sets how many retired versions may be skipped.
    #[must_use]
    pub fn with_max_bumps(mut self, max_bumps: u32) -> Self {
        self.max_bumps = max_bumps;
        self
    }

    /// Sets the per-request timeout for portal calls.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoints in use.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Logs in with a fresh session.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`AuthError`] for refused credentials, an exhausted
    /// redirect chain or an exhausted version range. Transport failures are
    /// returned as [`AuthError::Fetch`].
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        credentials.validate()?;

        let mut session = PortalSession::new(
            ApiLocation::new(self.endpoints.api_base.clone(), self.start_version),
            self.timeout,
        )?;

        self.sign_in(&session, credentials).await?;
        let profiles = discover_api_version(&mut session, self.max_bumps).await?;
        let context = fetch_profile_context(&session).await?;

        info!(
            version = session.api().version,
            institutions = context.institutions.len(),
            children = context.children().count(),
            "Logged in"
        );

        Ok(LoginOutcome {
            session,
            profiles,
            context,
        })
    }

    async fn sign_in(&self, session: &PortalSession, credentials: &Credentials) -> Result<(), AuthError> {
        let home = Url::parse(&self.endpoints.portal_home).map_err(FetchError::from)?;

        let entry = session.get_page(&self.endpoints.login_entry).await?;
        let idp_form = HtmlForm::require(&entry.body, &entry.url)?;
        let target = idp_form.target(&entry.url)?;
        let mut page = session
            .post_form(&target, &[("selectedIdp".to_string(), IDP_SELECTOR.to_string())])
            .await?;

        for attempt in 1..=MAX_LOGIN_REDIRECTS {
            page = submit_credentials(session, &page, credentials).await?;
            debug!(attempt, status = %page.status, "Login form submitted");
            if is_portal_home(&page.url, &home) {
                debug!(attempt, "Reached portal home");
                return Ok(());
            }
        }

        Err(AuthError::RedirectLimit {
            attempts: MAX_LOGIN_REDIRECTS,
        })
    }
}

async fn submit_credentials(
    session: &PortalSession,
    page: &Page,
    credentials: &Credentials,
) -> Result<Page, AuthError> {
    let mut form = HtmlForm::require(&page.body, &page.url)?;
    form.fill(&[
        ("username", credentials.username()),
        ("password", credentials.password()),
        ("selected-aktoer", ACCOUNT_TYPE),
    ]);
    let target = form.target(&page.url)?;
    Ok(session.post_form(&target, &form.fields).await?)
}

/// True when `url` is the portal home page, ignoring query and default port.
pub fn is_portal_home(url: &Url, home: &Url) -> bool {
    url.scheme() == home.scheme()
        && url.host_str() == home.host_str()
        && url.port_or_known_default() == home.port_or_known_default()
        && url.path() == home.path()
}
