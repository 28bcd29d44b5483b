//! Refresh command - one aggregation cycle.

use anyhow::Result;
use aula_store::SettingsStore;
use clap::Args;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the refresh command.
#[derive(Args, Default)]
pub struct RefreshArgs {
    /// Fetch the lesson calendar this run, whatever the setting says.
    #[arg(long)]
    pub school_schedule: bool,

    /// Fetch weekly plans and reminders this run, whatever the setting says.
    #[arg(long)]
    pub weekly_plans: bool,
}

/// Runs the refresh command.
pub async fn run(args: &RefreshArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let mut settings = settings.get().await;
    settings.school_schedule |= args.school_schedule;
    settings.weekly_plans |= args.weekly_plans;

    let mut client = super::build_client(&settings)?;
    let snapshot = client.refresh().await?;
    info!(
        children = snapshot.context.children().count(),
        "Refresh finished"
    );

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_snapshot(snapshot));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_snapshot(snapshot)?);
        }
    }

    Ok(())
}
