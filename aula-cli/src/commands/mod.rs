//! CLI command implementations.

pub mod api_call;
pub mod calendar;
pub mod config;
pub mod login;
pub mod refresh;
pub mod watch;

use anyhow::{Context, Result};
use aula_providers::{AulaClient, ClientConfig, Credentials};
use aula_store::{keychain, Settings, SettingsStore};

use crate::Cli;

/// Loads settings from `--config` or the default location.
pub async fn open_settings(cli: &Cli) -> Result<SettingsStore> {
    let store = match &cli.config {
        Some(path) => SettingsStore::load(path.clone()).await?,
        None => SettingsStore::load_default().await?,
    };
    Ok(store)
}

/// Credentials from the configured username and the resolved password.
pub fn credentials(settings: &Settings) -> Result<Credentials> {
    if !settings.has_username() {
        anyhow::bail!("No username configured. Run `aula login <username>` first");
    }
    let password = keychain::resolve_password(&settings.username).with_context(|| {
        format!(
            "No password for {}. Set {} or run `aula login`",
            settings.username,
            keychain::PASSWORD_ENV
        )
    })?;
    Ok(Credentials::new(settings.username.clone(), password))
}

/// Builds a client from settings.
pub fn build_client(settings: &Settings) -> Result<AulaClient> {
    let credentials = credentials(settings)?;
    let client = AulaClient::new(credentials, ClientConfig::from_settings(settings))?;
    Ok(client)
}
