//! CLI configuration.
//!
//! Everything lives in one `config.toml`, by default
//! `~/.config/wakeshift/config.toml`. Credential values and the webhook
//! verification token accept secret references (`pass::…`, `env::…`).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use wakeshift_core::OffsetPolicy;
use wakeshift_providers::auth::OAuthCredentials;
use wakeshift_providers::google::GoogleConfig;
use wakeshift_providers::oura::OuraConfig;
use wakeshift_server::{DEFAULT_BIND, WebhookConfig};

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeshiftConfig {
    /// Debug logging.
    pub debug: bool,

    /// Google Calendar settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSettings>,

    /// Oura settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oura: Option<OuraSettings>,

    /// Offset bounds.
    pub shift: OffsetPolicy,

    /// Webhook server settings.
    pub webhook: WebhookSettings,
}

impl WakeshiftConfig {
    /// Loads `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> ClientResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::config(format!("{}: {e}", path.display())))
    }

    /// Parses TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {e}"))
    }

    /// The file to use: an explicit path if given, otherwise the default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(Self::default_path, Path::to_path_buf)
    }

    /// `~/.config/wakeshift/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wakeshift")
            .join("config.toml")
    }

    /// The `[google]` section, or an error explaining how to add it.
    pub fn google(&self) -> ClientResult<&GoogleSettings> {
        self.google.as_ref().ok_or_else(|| {
            ClientError::config(
                "no [google] section in config.toml; run `wakeshift auth google` first",
            )
        })
    }

    /// Calendar to operate on: the override, the configured one, or
    /// `primary`.
    pub fn calendar_id(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.google.as_ref().map(|g| g.calendar_id.clone()))
            .unwrap_or_else(default_calendar_id)
    }

    /// Checks every section, resolving secret references on the way.
    pub fn validate(&self) -> ClientResult<()> {
        if let Some(google) = &self.google {
            google
                .to_provider_config()?
                .validate()
                .map_err(ClientError::Config)?;
        }
        if let Some(oura) = &self.oura {
            oura.to_provider_config()?
                .validate()
                .map_err(ClientError::Config)?;
        }
        if self.shift.max_offset_minutes <= 0 {
            return Err(ClientError::config(
                "shift.max_offset_minutes must be positive",
            ));
        }
        self.webhook
            .to_server_config(self.calendar_id(None))?
            .validate()?;
        Ok(())
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

/// `[google]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client ID.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Calendar to shift.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Token file override.
    pub token_path: Option<PathBuf>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            calendar_id: default_calendar_id(),
            token_path: None,
        }
    }
}

impl GoogleSettings {
    /// Resolves the credentials, expanding secret references.
    pub fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        resolve_credentials("google", self.client_id.as_deref(), self.client_secret.as_deref())
    }

    /// Builds the provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        let mut config = GoogleConfig::new(self.resolve_credentials()?);
        if let Some(path) = &self.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }
}

/// `[oura]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OuraSettings {
    /// OAuth client ID.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Token file override.
    pub token_path: Option<PathBuf>,

    /// Days before today searched for sleep sessions.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_lookback_days() -> u32 {
    OuraConfig::DEFAULT_LOOKBACK_DAYS
}

impl Default for OuraSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_path: None,
            lookback_days: default_lookback_days(),
        }
    }
}

impl OuraSettings {
    /// Resolves the credentials, expanding secret references.
    pub fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        resolve_credentials("oura", self.client_id.as_deref(), self.client_secret.as_deref())
    }

    /// Builds the provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<OuraConfig> {
        let mut config =
            OuraConfig::new(self.resolve_credentials()?).with_lookback_days(self.lookback_days);
        if let Some(path) = &self.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }
}

fn resolve_credentials(
    section: &str,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> ClientResult<OAuthCredentials> {
    let (Some(id), Some(secret_ref)) = (client_id, client_secret) else {
        return Err(ClientError::config(format!(
            "[{section}] needs both client_id and client_secret; \
             run `wakeshift auth {section} --client-id <ID> --client-secret <SECRET>`"
        )));
    };
    let id = secret::resolve(id)?;
    let secret_value = secret::resolve(secret_ref)?;
    Ok(OAuthCredentials::new(id, secret_value))
}

/// `[webhook]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Listen address.
    pub bind: String,

    /// Token given to Oura when subscribing; keys signature checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,

    /// Refuse unsigned or mis-signed notifications.
    pub require_signature: bool,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            verification_token: None,
            require_signature: false,
        }
    }
}

impl WebhookSettings {
    /// Resolves the verification token.
    pub fn resolve_token(&self) -> ClientResult<Option<String>> {
        Ok(secret::resolve_opt(self.verification_token.as_deref())?)
    }

    /// Builds the server configuration for `calendar_id`.
    pub fn to_server_config(&self, calendar_id: String) -> ClientResult<WebhookConfig> {
        let bind: SocketAddr = self
            .bind
            .parse()
            .map_err(|e| ClientError::config(format!("invalid webhook.bind {:?}: {e}", self.bind)))?;
        let mut config = WebhookConfig::new(bind)
            .with_calendar_id(calendar_id)
            .with_require_signature(self.require_signature);
        if let Some(token) = self.resolve_token()? {
            config = config.with_verification_token(token);
        }
        Ok(config)
    }
}

/// Writes OAuth credentials into `[section]` of the file at `path`,
/// keeping the rest of the file and its formatting intact.
pub fn save_credentials(
    path: &Path,
    section: &str,
    client_id: &str,
    client_secret: &str,
) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ClientError::config(format!("cannot edit {}: {e}", path.display())))?;

    if !doc.contains_table(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let table = doc[section].as_table_mut().ok_or_else(|| {
        ClientError::config(format!("`{section}` in {} is not a table", path.display()))
    })?;
    table["client_id"] = toml_edit::value(client_id);
    table["client_secret"] = toml_edit::value(client_secret);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    info!(path = %path.display(), section, "saved credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
debug = true

[google]
client_id = "id.apps.googleusercontent.com"
client_secret = "g-secret"
calendar_id = "me@example.com"

[oura]
client_id = "oura-id"
client_secret = "oura-secret"
lookback_days = 5

[shift]
max_offset_minutes = 240

[webhook]
bind = "127.0.0.1:5055"
verification_token = "hook-token"
require_signature = true
"#;

    #[test]
    fn parse_full_config() {
        let config = WakeshiftConfig::parse(FULL).unwrap();
        assert!(config.debug);
        assert_eq!(config.shift.max_offset_minutes, 240);
        assert_eq!(config.calendar_id(None), "me@example.com");
        assert_eq!(config.calendar_id(Some("other")), "other");

        let google = config.google().unwrap().to_provider_config().unwrap();
        assert_eq!(google.credentials.client_secret, "g-secret");

        let oura = config.oura.as_ref().unwrap().to_provider_config().unwrap();
        assert_eq!(oura.lookback_days, 5);
        assert_eq!(oura.credentials.client_id, "oura-id");

        let webhook = config
            .webhook
            .to_server_config(config.calendar_id(None))
            .unwrap();
        assert_eq!(webhook.bind.port(), 5055);
        assert_eq!(webhook.calendar_id, "me@example.com");
        assert!(webhook.require_signature);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = WakeshiftConfig::parse("").unwrap();
        assert!(!config.debug);
        assert!(config.google.is_none());
        assert_eq!(config.shift, OffsetPolicy::default());
        assert_eq!(config.webhook.bind, DEFAULT_BIND);
        assert_eq!(config.calendar_id(None), "primary");
        assert!(config.google().is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn section_defaults() {
        let config = WakeshiftConfig::parse("[google]\n[oura]\n").unwrap();
        assert_eq!(config.google.as_ref().unwrap().calendar_id, "primary");
        assert_eq!(config.oura.as_ref().unwrap().lookback_days, 3);

        let err = config.google().unwrap().resolve_credentials().unwrap_err();
        assert!(err.to_string().contains("wakeshift auth google"));
    }

    #[test]
    fn env_references_are_resolved() {
        unsafe {
            std::env::set_var("_WAKESHIFT_CFG_OURA_SECRET", "resolved-secret");
            std::env::set_var("_WAKESHIFT_CFG_HOOK", "resolved-token");
        }
        let config = WakeshiftConfig::parse(
            r#"
[oura]
client_id = "oura-id"
client_secret = "env::_WAKESHIFT_CFG_OURA_SECRET"

[webhook]
verification_token = "env::_WAKESHIFT_CFG_HOOK"
"#,
        )
        .unwrap();

        let creds = config.oura.as_ref().unwrap().resolve_credentials().unwrap();
        assert_eq!(creds.client_secret, "resolved-secret");
        assert_eq!(
            config.webhook.resolve_token().unwrap().as_deref(),
            Some("resolved-token")
        );
        unsafe {
            std::env::remove_var("_WAKESHIFT_CFG_OURA_SECRET");
            std::env::remove_var("_WAKESHIFT_CFG_HOOK");
        }
    }

    #[test]
    fn invalid_settings_fail_validation() {
        let bad_bind = WakeshiftConfig::parse("[webhook]\nbind = \"nowhere\"\n").unwrap();
        assert!(bad_bind.validate().is_err());

        let no_token = WakeshiftConfig::parse("[webhook]\nrequire_signature = true\n").unwrap();
        assert!(no_token.validate().is_err());

        let zero = WakeshiftConfig::parse("[shift]\nmax_offset_minutes = 0\n").unwrap();
        assert!(zero.validate().is_err());

        let bad_google = WakeshiftConfig::parse(
            "[google]\nclient_id = \"not-google\"\nclient_secret = \"s\"\n",
        )
        .unwrap();
        assert!(bad_google.validate().is_err());
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = WakeshiftConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.google.is_none());
    }

    #[test]
    fn resolve_path_prefers_explicit() {
        assert_eq!(
            WakeshiftConfig::resolve_path(Some(Path::new("/tmp/x.toml"))),
            PathBuf::from("/tmp/x.toml")
        );
        assert!(WakeshiftConfig::resolve_path(None).ends_with("wakeshift/config.toml"));
    }

    #[test]
    fn save_credentials_preserves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "# my settings\n[shift]\nmax_offset_minutes = 300 # five hours\n",
        )
        .unwrap();

        save_credentials(&path, "oura", "new-id", "new-secret").unwrap();
        save_credentials(&path, "google", "g.apps.googleusercontent.com", "gs").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# my settings"));
        assert!(written.contains("# five hours"));

        let config = WakeshiftConfig::load(&path).unwrap();
        assert_eq!(config.shift.max_offset_minutes, 300);
        assert_eq!(config.oura.unwrap().client_id.as_deref(), Some("new-id"));
        assert_eq!(config.google.unwrap().client_secret.as_deref(), Some("gs"));
    }

    #[test]
    fn save_credentials_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new").join("config.toml");
        save_credentials(&path, "oura", "id", "secret").unwrap();
        let config = WakeshiftConfig::load(&path).unwrap();
        assert_eq!(config.oura.unwrap().client_secret.as_deref(), Some("secret"));
    }
}
