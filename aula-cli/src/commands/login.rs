//! Login command - store credentials.

use anyhow::{Context, Result};
use aula_providers::{AulaClient, ClientConfig, Credentials};
use aula_store::{keychain, SettingsStore};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// UniLogin username. Defaults to the configured one.
    pub username: Option<String>,

    /// Remove the stored password instead of storing one.
    #[arg(long)]
    pub forget: bool,

    /// Store without trying the credentials against the portal.
    #[arg(long)]
    pub no_verify: bool,
}

/// Runs the login command.
///
/// The password is read as one line from stdin and stored in the keychain.
pub async fn run(args: &LoginArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let current = settings.get().await;
    let username = args
        .username
        .clone()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| current.has_username().then(|| current.username.clone()))
        .context("No username given and none configured")?;

    if args.forget {
        keychain::delete_password(&username)?;
        info!(username = %username, "Password removed");
        if !cli.quiet {
            println!("Removed stored password for {username}");
        }
        return Ok(());
    }

    if !cli.quiet {
        eprintln!("Password for {username}:");
    }
    let password = read_password().await?;
    let credentials = Credentials::new(username.clone(), password);
    credentials.validate()?;

    let mut verified = None;
    if !args.no_verify {
        let config = ClientConfig::from_settings(&current);
        let mut client = AulaClient::new(credentials.clone(), config)?;
        client.login().await?;
        verified = Some(client.context().children().count());
    }

    keychain::store_password(&username, credentials.password())?;
    settings.update(|s| s.username.clone_from(&username)).await;
    settings.save().await?;
    info!(username = %username, "Credentials stored");

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                match verified {
                    Some(children) => println!("Logged in as {username} ({children} children)"),
                    None => println!("Stored credentials for {username}"),
                }
            }
        }
        OutputFormat::Json => {
            let out = serde_json::json!({
                "username": username,
                "verified": verified.is_some(),
                "children": verified,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&out)?);
        }
    }

    Ok(())
}

async fn read_password() -> Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Empty password");
    }
    Ok(password)
}
