//! Authentication commands.

use std::path::{Path, PathBuf};

use tracing::info;
use wakeshift_providers::auth::{OAuthCredentials, OAuthSession};
use wakeshift_providers::google::{GoogleConfig, GoogleProvider};
use wakeshift_providers::oura::OuraProvider;

use crate::config::{GoogleSettings, OuraSettings, WakeshiftConfig, save_credentials};
use crate::error::{ClientError, ClientResult};

/// Where credentials came from.
#[derive(Debug, PartialEq, Eq)]
enum CredentialSource {
    /// Flags, environment or a credentials file; persisted after success.
    Cli,
    /// Already in config.toml.
    Config,
}

/// Runs the Google consent flow.
///
/// Credentials given on the command line are written to `config.toml` so
/// later runs and the webhook server find them.
pub async fn google(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &WakeshiftConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let (credentials, source) = resolve_credentials(
        "google",
        client_id,
        client_secret,
        credentials_file.as_deref(),
        config.google.as_ref().map(GoogleSettings::resolve_credentials),
    )?;

    let settings = config.google.clone().unwrap_or_default();
    let mut provider_config = GoogleConfig::new(credentials.clone());
    if let Some(path) = &settings.token_path {
        provider_config = provider_config.with_token_path(path);
    }
    let session = GoogleProvider::session(&provider_config)?;

    println!("Starting Google Calendar authentication...");
    println!();
    println!("A browser window will open for you to authorize calendar access.");
    println!("If it doesn't, open the URL printed below.");
    println!();
    authenticate(session, force, "Google Calendar").await?;

    persist(config_path, "google", &credentials, &source)
}

/// Runs the Oura consent flow.
pub async fn oura(
    client_id: Option<String>,
    client_secret: Option<String>,
    force: bool,
    config: &WakeshiftConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let (credentials, source) = resolve_credentials(
        "oura",
        client_id,
        client_secret,
        None,
        config.oura.as_ref().map(OuraSettings::resolve_credentials),
    )?;

    let settings = OuraSettings {
        client_id: Some(credentials.client_id.clone()),
        client_secret: Some(credentials.client_secret.clone()),
        ..config.oura.clone().unwrap_or_default()
    };
    let session = OuraProvider::session(&settings.to_provider_config()?)?;

    println!("Starting Oura authentication...");
    println!();
    println!("Authorize access in the browser; Oura redirects back to this machine.");
    println!();
    authenticate(session, force, "Oura").await?;

    persist(config_path, "oura", &credentials, &source)
}

async fn authenticate(session: OAuthSession, force: bool, name: &str) -> ClientResult<()> {
    if !session.needs_reauth() && !force {
        println!("Already authenticated with {name}.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    session.authorize().await?;
    info!(provider = name, path = %session.storage().path().display(), "stored tokens");
    println!("Authentication successful!");
    println!("Tokens saved to {}", session.storage().path().display());
    Ok(())
}

fn persist(
    config_path: &Path,
    section: &str,
    credentials: &OAuthCredentials,
    source: &CredentialSource,
) -> ClientResult<()> {
    if *source == CredentialSource::Config {
        return Ok(());
    }
    save_credentials(
        config_path,
        section,
        &credentials.client_id,
        &credentials.client_secret,
    )?;
    println!("Credentials saved to {}", config_path.display());
    Ok(())
}

/// Picks credentials by priority: both flags, then a credentials file,
/// then `config.toml`.
fn resolve_credentials(
    section: &str,
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<&Path>,
    from_config: Option<ClientResult<OAuthCredentials>>,
) -> ClientResult<(OAuthCredentials, CredentialSource)> {
    let (credentials, source) = match (cli_client_id, cli_client_secret) {
        (Some(id), Some(secret)) => (OAuthCredentials::new(id, secret), CredentialSource::Cli),
        (Some(_), None) | (None, Some(_)) => {
            return Err(ClientError::config(
                "both --client-id and --client-secret are required when providing credentials directly",
            ));
        }
        (None, None) => {
            if let Some(path) = cli_credentials_file {
                let creds = OAuthCredentials::from_file(path).map_err(|e| {
                    ClientError::config(format!(
                        "failed to load credentials from {}: {e}",
                        path.display()
                    ))
                })?;
                (creds, CredentialSource::Cli)
            } else {
                match from_config {
                    Some(creds) => (creds?, CredentialSource::Config),
                    None => {
                        return Err(ClientError::config(format!(
                            "{section} credentials are required; pass --client-id and \
                             --client-secret or add them to [{section}] in config.toml"
                        )));
                    }
                }
            }
        }
    };

    credentials
        .validate()
        .map_err(|e| ClientError::config(format!("invalid {section} credentials: {e}")))?;
    Ok((credentials, source))
}
