//! Api-call command - raw portal requests.

use anyhow::Result;
use aula_store::SettingsStore;
use clap::Args;

use crate::output::JsonFormatter;
use crate::Cli;

/// Arguments for the api-call command.
#[derive(Args)]
pub struct ApiCallArgs {
    /// Path and query appended to the versioned API base,
    /// e.g. `?method=profiles.getProfilesByLogin`.
    pub uri: String,

    /// JSON body. When given the call is a POST.
    #[arg(long)]
    pub post_data: Option<String>,
}

/// Runs the api-call command. The reply is always printed as JSON.
pub async fn run(args: &ApiCallArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = settings.get().await;
    let mut client = super::build_client(&settings)?;

    let reply = client.api_call(&args.uri, args.post_data.as_deref()).await?;

    let formatter = JsonFormatter::new(cli.pretty);
    println!("{}", formatter.format(&reply)?);
    Ok(())
}
