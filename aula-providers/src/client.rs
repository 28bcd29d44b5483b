//! The refresh pipeline.
//!
//! [`AulaClient`] owns the session, the widget broker and the last
//! snapshot. One call to [`AulaClient::refresh`] runs every stage in order:
//!
//! 1. liveness probe, logging in again when it fails
//! 2. profile context (full overwrite)
//! 3. presence per child
//! 4. unread messages
//! 5. calendar side file, when enabled
//! 6. weekly plans and reminders, when enabled
//!
//! Stages after login never abort the cycle; a failing stage is logged and
//! leaves its part of the snapshot empty.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aula_core::{AulaSnapshot, InstitutionContext, WeekSlot};
use aula_fetch::session::DEFAULT_PORTAL_TIMEOUT;
use aula_fetch::widget::DEFAULT_WIDGET_TIMEOUT;
use aula_fetch::{Endpoints, PortalSession, WidgetHttp};
use aula_store::settings_store::{DEFAULT_API_VERSION, DEFAULT_MAX_API_VERSION_BUMPS};
use aula_store::{default_calendar_path, CalendarFile, Settings};
use chrono::{Local, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::{Authenticator, Credentials};
use crate::error::ClientError;
use crate::portal::{
    api_call, fetch_all_presence, fetch_calendar, fetch_profile_context, fetch_unread_messages,
    is_session_alive,
};
use crate::widgets::{
    default_sources, fetch_reminders, ids, WeeklySource, WeeklyUpdate, WidgetBroker, WidgetRequest,
};

/// A client shared between a scheduler and other callers.
///
/// The mutex serializes refreshes against the one session.
pub type SharedClient = Arc<Mutex<AulaClient>>;

// ============================================================================
// Configuration
// ============================================================================

/// Everything the client needs besides credentials.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upstream base URLs.
    pub endpoints: Endpoints,
    /// Run the calendar stage.
    pub school_schedule: bool,
    /// Run the weekly-plan and reminder stage.
    pub weekly_plans: bool,
    /// First API version to probe.
    pub api_version: u32,
    /// Retired API versions that may be skipped.
    pub max_api_version_bumps: u32,
    /// Calendar side file.
    pub calendar_path: PathBuf,
    /// Per-request timeout for portal calls.
    pub portal_timeout: Duration,
    /// Per-request timeout for widget back-ends.
    pub widget_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            school_schedule: false,
            weekly_plans: false,
            api_version: DEFAULT_API_VERSION,
            max_api_version_bumps: DEFAULT_MAX_API_VERSION_BUMPS,
            calendar_path: default_calendar_path(),
            portal_timeout: DEFAULT_PORTAL_TIMEOUT,
            widget_timeout: DEFAULT_WIDGET_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Configuration from persisted settings with production endpoints.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            school_schedule: settings.school_schedule,
            weekly_plans: settings.weekly_plans,
            api_version: settings.api_version,
            max_api_version_bumps: settings.max_api_version_bumps,
            calendar_path: settings.calendar_path(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Session owner and refresh pipeline.
pub struct AulaClient {
    credentials: Credentials,
    config: ClientConfig,
    authenticator: Authenticator,
    widget_http: WidgetHttp,
    calendar: CalendarFile,
    sources: Vec<Box<dyn WeeklySource>>,
    session: Option<PortalSession>,
    context: InstitutionContext,
    broker: WidgetBroker,
    blocked: Option<String>,
    snapshot: AulaSnapshot,
}

impl std::fmt::Debug for AulaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AulaClient")
            .field("credentials", &self.credentials)
            .field("logged_in", &self.session.is_some())
            .field("blocked", &self.blocked)
            .field("widgets", self.broker.widgets())
            .finish_non_exhaustive()
    }
}

impl AulaClient {
    /// Creates a client. Nothing is fetched until the first refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget HTTP client cannot be built.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, ClientError> {
        let authenticator = Authenticator::new(config.endpoints.clone())
            .with_api_version(config.api_version)
            .with_max_bumps(config.max_api_version_bumps)
            .with_timeout(config.portal_timeout);
        let widget_http = WidgetHttp::with_timeout(config.widget_timeout)?;
        let calendar = CalendarFile::new(config.calendar_path.clone());

        Ok(Self {
            credentials,
            config,
            authenticator,
            widget_http,
            calendar,
            sources: default_sources(),
            session: None,
            context: InstitutionContext::default(),
            broker: WidgetBroker::new(),
            blocked: None,
            snapshot: AulaSnapshot::new(),
        })
    }

    /// Replaces the weekly sources.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Box<dyn WeeklySource>>) -> Self {
        self.sources = sources;
        self
    }

    /// Wraps the client for shared use.
    pub fn into_shared(self) -> SharedClient {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The last completed snapshot.
    pub fn snapshot(&self) -> &AulaSnapshot {
        &self.snapshot
    }

    /// Profile context from the last login or refresh.
    pub fn context(&self) -> &InstitutionContext {
        &self.context
    }

    /// Enabled widgets, empty until discovered.
    pub fn widgets(&self) -> &BTreeMap<String, String> {
        self.broker.widgets()
    }

    /// Returns true while a session is held.
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// API version of the current session.
    pub fn api_version(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.api().version)
    }

    /// Why refreshes are blocked, if they are.
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked.as_deref()
    }

    /// The calendar side file.
    pub fn calendar(&self) -> &CalendarFile {
        &self.calendar
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replaces the credentials, dropping the session and any block.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        info!(username = %credentials.username(), "Credentials replaced");
        self.credentials = credentials;
        self.session = None;
        self.blocked = None;
    }

    // ------------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------------

    fn ensure_not_blocked(&self) -> Result<(), ClientError> {
        match &self.blocked {
            Some(reason) => Err(ClientError::Blocked(reason.clone())),
            None => Ok(()),
        }
    }

    /// Logs in with a fresh session, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Blocked`] after an earlier fatal error, or the
    /// login error. A fatal login error blocks the client.
    pub async fn login(&mut self) -> Result<(), ClientError> {
        self.session = None;
        let session = self.login_session().await?;
        self.session = Some(session);
        Ok(())
    }

    #[instrument(skip(self), fields(username = %self.credentials.username()))]
    async fn login_session(&mut self) -> Result<PortalSession, ClientError> {
        self.ensure_not_blocked()?;
        match self.authenticator.login(&self.credentials).await {
            Ok(outcome) => {
                self.context = outcome.context;
                Ok(outcome.session)
            }
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Login failed, blocking refreshes until credentials change");
                self.blocked = Some(e.to_string());
                Err(e.into())
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------------

    /// Runs one refresh cycle and returns the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error only when no session could be established. Stage
    /// failures are logged and leave their part of the snapshot empty.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<&AulaSnapshot, ClientError> {
        self.ensure_not_blocked()?;

        let alive = match &self.session {
            Some(session) => is_session_alive(session).await,
            None => false,
        };
        let session = match self.session.take() {
            Some(session) if alive => session,
            previous => {
                info!(expired = previous.is_some(), "No live session, logging in");
                self.login_session().await?
            }
        };

        let snapshot = self.collect(&session, !alive).await;
        self.session = Some(session);
        self.snapshot = snapshot;
        info!(
            children = self.snapshot.context.children().count(),
            unread = self.snapshot.messages.count(),
            "Refresh complete"
        );
        Ok(&self.snapshot)
    }

    async fn collect(&mut self, session: &PortalSession, fresh_login: bool) -> AulaSnapshot {
        if !fresh_login {
            match fetch_profile_context(session).await {
                Ok(context) => self.context = context,
                Err(e) => warn!(error = %e, "Profile context refresh failed, keeping the previous one"),
            }
        }

        let mut snapshot = AulaSnapshot::new();
        snapshot.context = self.context.clone();
        snapshot.presence = fetch_all_presence(session, &snapshot.context).await;

        match fetch_unread_messages(session).await {
            Ok(messages) => snapshot.messages = messages,
            Err(e) => warn!(error = %e, "Message fetch failed"),
        }

        if self.config.school_schedule {
            self.refresh_calendar(session, &snapshot.context).await;
        }
        if self.config.weekly_plans {
            self.refresh_weekly(session, &mut snapshot).await;
        }

        snapshot.widgets = self.broker.widgets().clone();
        snapshot.updated_at = Some(Utc::now());
        snapshot
    }

    async fn refresh_calendar(&self, session: &PortalSession, context: &InstitutionContext) {
        match fetch_calendar(session, context, Utc::now()).await {
            Ok(body) => {
                if let Err(e) = self.calendar.write_raw(&body).await {
                    warn!(path = %self.calendar.path().display(), error = %e, "Calendar file write failed");
                }
            }
            Err(e) => warn!(error = %e, "Calendar fetch failed"),
        }
    }

    async fn refresh_weekly(&mut self, session: &PortalSession, snapshot: &mut AulaSnapshot) {
        if !self.broker.is_discovered() {
            if let Err(e) = self.broker.discover(session).await {
                warn!(error = %e, "Widget discovery failed");
                return;
            }
        }

        let today = Local::now().date_naive();
        let username = self.credentials.username();

        for source in &self.sources {
            let widget_id = source.widget_id();
            if !self.broker.has(widget_id) {
                continue;
            }
            for slot in WeekSlot::BOTH {
                let week = slot.label(today);
                let token = match self.broker.token(session, widget_id).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!(source = source.name(), error = %e, "Widget token failed");
                        continue;
                    }
                };
                let request = WidgetRequest {
                    http: &self.widget_http,
                    endpoints: &self.config.endpoints,
                    context: &snapshot.context,
                    username,
                    token: &token,
                };
                match source.fetch_week(&request, &week).await {
                    Ok(WeeklyUpdate::Tasks(tasks)) => *snapshot.tasks.get_mut(slot) = tasks,
                    Ok(WeeklyUpdate::Letters(letters)) => {
                        snapshot.weekly_letters.get_mut(slot).extend(letters);
                    }
                    Err(e) => warn!(source = source.name(), %week, error = %e, "Weekly source failed"),
                }
            }
        }

        if self.broker.has(ids::REMINDERS) {
            match self.broker.token(session, ids::REMINDERS).await {
                Ok(token) => {
                    let request = WidgetRequest {
                        http: &self.widget_http,
                        endpoints: &self.config.endpoints,
                        context: &snapshot.context,
                        username,
                        token: &token,
                    };
                    match fetch_reminders(&request, today).await {
                        Ok(reminders) => snapshot.reminders = reminders,
                        Err(e) => warn!(error = %e, "Reminders fetch failed"),
                    }
                }
                Err(e) => warn!(error = %e, "Reminders token failed"),
            }
        }
        debug!(
            this_week = snapshot.tasks.this_week.len(),
            letters = snapshot.weekly_letters.this_week.len(),
            reminders = snapshot.reminders.len(),
            "Weekly plans updated"
        );
    }

    // ------------------------------------------------------------------------
    // Passthrough
    // ------------------------------------------------------------------------

    /// Calls the portal API directly, logging in first if needed.
    ///
    /// See [`crate::portal::api_call`] for the reply shapes.
    ///
    /// # Errors
    ///
    /// Returns an error when no session can be established or on transport
    /// failure.
    pub async fn api_call(&mut self, uri: &str, post_data: Option<&str>) -> Result<Value, ClientError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => self.login_session().await?,
        };
        let result = api_call(&session, uri, post_data).await;
        self.session = Some(session);
        Ok(result?)
    }
}
