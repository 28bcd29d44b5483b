// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Aula CLI - school portal status from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Store credentials (password read from stdin)
//! aula login anna0001
//!
//! # One refresh cycle (default command)
//! aula
//!
//! # JSON output
//! aula refresh --format json --pretty
//!
//! # Refresh on the configured interval
//! aula watch
//!
//! # Lessons from the calendar side file
//! aula calendar --child 101
//!
//! # Raw portal call
//! aula api-call "?method=profiles.getProfilesByLogin"
//!
//! # Feature flags
//! aula config set weekly_plans true
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use aula_providers::ClientError;
use aula_store::LogLevel;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{api_call, calendar, config, login, refresh, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// Aula CLI - presence, messages and weekly plans from the Aula portal.
#[derive(Parser)]
#[command(name = "aula")]
#[command(about = "Aula school portal client")]
#[command(long_about = r#"
Logs in to the Aula school portal as a guardian and collects, per cycle:

  • Presence for every child
  • Up to 10 unread messages
  • The 14-day lesson calendar (when school_schedule is enabled)
  • Weekly plans, weekly letters and reminders (when weekly_plans is enabled)

Examples:
  aula login anna0001            # Store username and password
  aula                           # One refresh cycle
  aula --format json --pretty    # JSON output
  aula watch                     # Refresh on the configured interval
  aula calendar                  # Lessons from the calendar side file
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'refresh' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one refresh cycle (default if no command specified).
    #[command(visible_alias = "r")]
    Refresh(refresh::RefreshArgs),

    /// Refresh repeatedly on the configured interval.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Call the portal API directly.
    ApiCall(api_call::ApiCallArgs),

    /// Show lessons from the calendar side file.
    #[command(visible_alias = "c")]
    Calendar(calendar::CalendarArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),

    /// Store credentials.
    Login(login::LoginArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Login is blocked until the credentials change.
    AuthBlocked = 2,
}

impl ExitCode {
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ClientError>() {
            Some(e) if e.is_blocking() => Self::AuthBlocked,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("aula=debug,info")
    } else {
        EnvFilter::new(format!("aula={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = commands::open_settings(&cli).await?;
    setup_logging(cli.verbose, cli.quiet, settings.get().await.log_level);

    let result = match &cli.command {
        Some(Commands::Refresh(args)) => refresh::run(args, &settings, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &settings, &cli).await,
        Some(Commands::ApiCall(args)) => api_call::run(args, &settings, &cli).await,
        Some(Commands::Calendar(args)) => calendar::run(args, &settings, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &settings, &cli).await,
        Some(Commands::Login(args)) => login::run(args, &settings, &cli).await,
        None => refresh::run(&refresh::RefreshArgs::default(), &settings, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
