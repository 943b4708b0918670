//! wakeshift CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use wakeshift_core::{TracingConfig, init_tracing};

use wakeshift_cli::cli::{AuthProvider, Cli, Command, ConfigAction, WebhookAction};
use wakeshift_cli::commands;
use wakeshift_cli::config::WakeshiftConfig;
use wakeshift_cli::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = WakeshiftConfig::resolve_path(cli.config.as_deref());
    let config = WakeshiftConfig::load(&config_path)?;
    let debug = cli.debug || config.debug;
    let command = cli.into_command();

    let tracing = match command {
        Command::Serve { .. } if debug => TracingConfig::server().with_level(tracing::Level::DEBUG),
        Command::Serve { .. } => TracingConfig::server(),
        _ => TracingConfig::cli(debug),
    };
    init_tracing(tracing)?;

    match command {
        Command::Shift(args) => commands::shift::run(args, &config).await,
        Command::Auth { provider } => match provider {
            AuthProvider::Google {
                client_id,
                client_secret,
                credentials_file,
                force,
            } => {
                commands::auth::google(
                    client_id,
                    client_secret,
                    credentials_file,
                    force,
                    &config,
                    &config_path,
                )
                .await
            }
            AuthProvider::Oura {
                client_id,
                client_secret,
                force,
            } => commands::auth::oura(client_id, client_secret, force, &config, &config_path).await,
        },
        Command::Webhook { action } => match action {
            WebhookAction::List => commands::webhook::list(&config).await,
            WebhookAction::Subscribe {
                url,
                verification_token,
            } => commands::webhook::subscribe(&url, verification_token, &config).await,
            WebhookAction::Delete { id } => commands::webhook::delete(&id, &config).await,
        },
        Command::Serve { bind, calendar } => commands::serve::run(bind, calendar, &config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
