//! Config command - manage configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use aula_store::{default_calendar_path, default_config_dir, LogLevel, Settings, SettingsStore};
use clap::{Args, Subcommand};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Change one setting.
    Set {
        /// One of: username, school_schedule, weekly_plans, api_version,
        /// max_api_version_bumps, calendar_path, refresh_interval, log_level.
        key: String,

        /// New value. `default` resets calendar_path.
        value: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(settings, cli).await,
        ConfigAction::Path => show_paths(settings, cli),
        ConfigAction::Set { key, value } => set_value(settings, key, value).await,
        ConfigAction::Reset => reset_config(settings).await,
    }
}

async fn show_config(store: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let username = if settings.has_username() {
                settings.username.as_str()
            } else {
                "(not set)"
            };
            println!("Aula Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Username:              {username}");
            println!("School schedule:       {}", settings.school_schedule);
            println!("Weekly plans:          {}", settings.weekly_plans);
            println!("API version:           {}", settings.api_version);
            println!("Max version bumps:     {}", settings.max_api_version_bumps);
            println!("Calendar file:         {}", settings.calendar_path().display());
            println!("Refresh interval:      {}s", settings.refresh_interval().as_secs());
            println!("Log level:             {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(store: &SettingsStore, cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = store.path();
    let calendar_path = default_calendar_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Calendar file: {}", calendar_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "calendar_file": calendar_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(store: &SettingsStore, key: &str, value: &str) -> Result<()> {
    let mut settings = store.get().await;
    apply(&mut settings, key, value)?;

    store.update(|s| *s = settings).await;
    store.save().await?;

    info!(key, value, "Setting updated");
    println!("{key} set to: {value}");
    Ok(())
}

/// Applies one `key = value` change.
fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "username" => settings.username = value.trim().to_string(),
        "school_schedule" => settings.school_schedule = parse_bool(value)?,
        "weekly_plans" => settings.weekly_plans = parse_bool(value)?,
        "api_version" => {
            settings.api_version = value.parse().context("api_version must be a number")?;
        }
        "max_api_version_bumps" => {
            settings.max_api_version_bumps = value
                .parse()
                .context("max_api_version_bumps must be a number")?;
        }
        "calendar_path" => {
            settings.calendar_path = match value {
                "" | "default" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        "refresh_interval" | "refresh_interval_secs" => {
            settings.refresh_interval_secs = value
                .parse()
                .context("refresh_interval must be a number of seconds")?;
        }
        "log_level" => settings.log_level = value.parse::<LogLevel>()?,
        other => anyhow::bail!("Unknown setting: {other}"),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => anyhow::bail!("Expected true or false, got: {value}"),
    }
}

async fn reset_config(store: &SettingsStore) -> Result<()> {
    let path = store.path();

    if path.exists() {
        tokio::fs::remove_file(path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
