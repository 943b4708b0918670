//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// wakeshift - move today's calendar by how late you woke up
#[derive(Debug, Parser)]
#[command(name = "wakeshift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "WAKESHIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Shift options used when no subcommand is given
    #[command(flatten)]
    pub shift: ShiftArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run; shifting today is the default.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Shift(self.shift))
    }
}

/// Options for shifting today's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ShiftArgs {
    /// Shift by this many minutes instead of reading the wake time from Oura
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Show what would move without writing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Calendar to shift (defaults to google.calendar_id, then "primary")
    #[arg(long)]
    pub calendar: Option<String>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shift today's events (the default)
    Shift(ShiftArgs),

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Manage the Oura webhook subscription
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },

    /// Run the webhook server in the foreground
    Serve {
        /// Address to listen on (defaults to webhook.bind)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Calendar to shift on each notification
        #[arg(long)]
        calendar: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Authenticate with Google Calendar
    Google {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to the credentials JSON downloaded from Google Cloud Console
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Force re-authentication even if already authenticated
        #[arg(long, short)]
        force: bool,
    },

    /// Authenticate with Oura
    Oura {
        /// OAuth client ID of the Oura application
        #[arg(long, env = "OURA_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret of the Oura application
        #[arg(long, env = "OURA_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Force re-authentication even if already authenticated
        #[arg(long, short)]
        force: bool,
    },
}

/// Webhook subscription actions.
#[derive(Debug, Subcommand)]
pub enum WebhookAction {
    /// List existing subscriptions
    List,

    /// Subscribe a public URL to new sleep data
    Subscribe {
        /// Public callback URL, ending in /webhook/oura
        #[arg(long)]
        url: String,

        /// Verification token (defaults to webhook.verification_token)
        #[arg(long, env = "OURA_WEBHOOK_TOKEN")]
        verification_token: Option<String>,
    },

    /// Delete a subscription by id
    Delete {
        /// Subscription id
        id: String,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_shifts() {
        let cli = Cli::parse_from(["wakeshift", "--dry-run", "--offset", "-15"]);
        match cli.into_command() {
            Command::Shift(args) => {
                assert!(args.dry_run);
                assert_eq!(args.offset, Some(-15));
                assert_eq!(args.calendar, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn shift_subcommand() {
        let cli = Cli::parse_from(["wakeshift", "shift", "--calendar", "work", "-n"]);
        match cli.into_command() {
            Command::Shift(args) => {
                assert!(args.dry_run);
                assert_eq!(args.calendar.as_deref(), Some("work"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn webhook_subscribe() {
        let cli = Cli::parse_from([
            "wakeshift",
            "webhook",
            "subscribe",
            "--url",
            "https://tunnel.example/webhook/oura",
            "--verification-token",
            "tok",
        ]);
        match cli.into_command() {
            Command::Webhook {
                action: WebhookAction::Subscribe { url, verification_token },
            } => {
                assert_eq!(url, "https://tunnel.example/webhook/oura");
                assert_eq!(verification_token.as_deref(), Some("tok"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_bind_and_global_flags() {
        let cli = Cli::parse_from(["wakeshift", "serve", "--bind", "127.0.0.1:9000", "--debug"]);
        assert!(cli.debug);
        match cli.into_command() {
            Command::Serve { bind, .. } => assert_eq!(bind.unwrap().port(), 9000),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
