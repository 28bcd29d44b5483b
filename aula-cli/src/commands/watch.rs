//! Watch command - refresh on an interval.

use std::io::{stdout, Write};
use std::time::Duration;

use anyhow::Result;
use aula_providers::SharedClient;
use aula_store::settings_store::MIN_REFRESH_INTERVAL_SECS;
use aula_store::{SettingsStore, SnapshotStore};
use clap::Args;
use tokio::time::interval;
use tracing::{info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds. Defaults to the configured interval.
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Do not clear the screen between cycles.
    #[arg(long)]
    pub no_clear: bool,
}

/// Runs the watch command until Ctrl+C or a blocking login error.
pub async fn run(args: &WatchArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = settings.get().await;
    let period = args.interval.map_or_else(
        || settings.refresh_interval(),
        |secs| Duration::from_secs(secs.max(MIN_REFRESH_INTERVAL_SECS)),
    );

    info!(interval = period.as_secs(), "Starting watch mode");

    let client = super::build_client(&settings)?.into_shared();
    let store = SnapshotStore::new();

    let mut ticker = interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Watch mode stopped");
                return Ok(());
            }
        }

        cycle(&client, &store).await?;
        render(&store, period, args, cli).await?;
    }
}

/// One refresh into the store. Only blocking errors end the watch.
async fn cycle(client: &SharedClient, store: &SnapshotStore) -> Result<()> {
    store.start_refresh().await?;

    let result = {
        let mut client = client.lock().await;
        client.refresh().await.cloned()
    };

    match result {
        Ok(snapshot) => store.set(snapshot).await,
        Err(e) if e.is_blocking() => {
            store.end_refresh().await;
            return Err(e.into());
        }
        Err(e) => {
            warn!(error = %e, "Refresh failed, keeping previous snapshot");
            store.set_error(e.to_string()).await;
        }
    }

    store.end_refresh().await;
    Ok(())
}

async fn render(store: &SnapshotStore, period: Duration, args: &WatchArgs, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            if let Some(snapshot) = store.get().await {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format_snapshot(&snapshot)?);
            }
        }
        OutputFormat::Text => {
            if !args.no_clear {
                print!("\x1b[2J\x1b[H");
                stdout().flush()?;
            }

            let now = chrono::Local::now();
            println!(
                "Aula Watch Mode - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                period.as_secs()
            );
            println!("{}", "─".repeat(50));
            println!();

            let formatter = TextFormatter::new(!cli.no_color);
            if let Some(error) = store.error().await {
                println!("{}", formatter.format_error(&error));
                println!();
            }
            match store.get().await {
                Some(snapshot) => println!("{}", formatter.format_snapshot(&snapshot)),
                None => println!("No data yet"),
            }
            println!();
            println!("Press Ctrl+C to exit");
        }
    }
    Ok(())
}
