//! User settings store.
//!
//! Manages the account name, feature flags and refresh tuning with
//! persistence and change notification. The password is not stored here; see
//! [`crate::keychain`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_calendar_path, default_settings_path, load_json, save_json};

/// API version the first probe starts at.
pub const DEFAULT_API_VERSION: u32 = 19;

/// How many times version discovery may bump before giving up.
pub const DEFAULT_MAX_API_VERSION_BUMPS: u32 = 10;

/// Default interval between refresh cycles.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Shortest refresh interval accepted.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

// ============================================================================
// Settings Types
// ============================================================================

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// UniLogin username.
    pub username: String,

    /// Fetch the 14-day lesson calendar and write the side file.
    pub school_schedule: bool,

    /// Fetch weekly plans, weekly letters and reminders from widgets.
    pub weekly_plans: bool,

    /// API version to start probing at.
    pub api_version: u32,

    /// Upper bound on version bumps during discovery.
    pub max_api_version_bumps: u32,

    /// Calendar side-file location. `None` uses the cache directory.
    pub calendar_path: Option<PathBuf>,

    /// Seconds between refresh cycles in watch mode.
    pub refresh_interval_secs: u64,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            school_schedule: false,
            weekly_plans: false,
            api_version: DEFAULT_API_VERSION,
            max_api_version_bumps: DEFAULT_MAX_API_VERSION_BUMPS,
            calendar_path: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Refresh interval, never shorter than a minute.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    /// Resolved calendar side-file path.
    pub fn calendar_path(&self) -> PathBuf {
        self.calendar_path
            .clone()
            .unwrap_or_else(default_calendar_path)
    }

    /// Returns true once a username is configured.
    pub fn has_username(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Config(format!("unknown log level: {other}"))),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings bound to `path`.
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for callers that propagate.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        let store = Self::new(path);
        *store.settings.write().await = settings;
        Ok(store)
    }

    /// Path the store saves to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}
