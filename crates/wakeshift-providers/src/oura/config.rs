//! Oura provider configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{OAuthCredentials, OAuthEndpoints, RedirectTarget};
use crate::http::DEFAULT_TIMEOUT;

const OURA_AUTH_URL: &str = "https://cloud.ouraring.com/oauth/authorize";
const OURA_TOKEN_URL: &str = "https://api.ouraring.com/oauth/token";

/// Base URL of the Oura API.
pub const OURA_API_BASE: &str = "https://api.ouraring.com";

/// Redirect URI registered for the Oura application.
pub const OURA_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Configuration for the Oura wake source and webhook management.
#[derive(Debug, Clone)]
pub struct OuraConfig {
    /// OAuth credentials of the Oura application. The webhook API also
    /// authenticates with them directly.
    pub credentials: OAuthCredentials,

    /// Path to store OAuth tokens.
    ///
    /// Defaults to `~/.local/share/wakeshift/oura-tokens.json`.
    pub token_path: PathBuf,

    /// How many days before today to search for sleep sessions. Sleep that
    /// started before midnight is dated the previous day.
    pub lookback_days: u32,

    /// Request timeout.
    pub timeout: Duration,

    /// Redirect URI for the consent flow.
    pub redirect_uri: String,

    /// API base URL, overridable for tests.
    pub api_base: String,
}

impl OuraConfig {
    /// Default sleep lookback in days.
    pub const DEFAULT_LOOKBACK_DAYS: u32 = 3;

    /// Scopes needed to read sleep sessions.
    pub const SCOPES: [&'static str; 3] = ["daily", "sleep", "personal"];

    /// Creates a new configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_path: Self::default_token_path(),
            lookback_days: Self::DEFAULT_LOOKBACK_DAYS,
            timeout: DEFAULT_TIMEOUT,
            redirect_uri: OURA_REDIRECT_URI.to_string(),
            api_base: OURA_API_BASE.to_string(),
        }
    }

    /// Returns the default token storage path.
    pub fn default_token_path() -> PathBuf {
        crate::data_dir().join("oura-tokens.json")
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the sleep lookback.
    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Requested OAuth scopes.
    pub fn scopes(&self) -> Vec<String> {
        Self::SCOPES.iter().map(|s| s.to_string()).collect()
    }

    /// OAuth endpoints. Oura does not take a PKCE challenge.
    pub fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints {
            auth_url: OURA_AUTH_URL.to_string(),
            token_url: OURA_TOKEN_URL.to_string(),
            pkce: false,
            extra_auth_params: Vec::new(),
        }
    }

    /// Redirect target for the consent flow.
    pub fn redirect(&self) -> RedirectTarget {
        RedirectTarget::Fixed(self.redirect_uri.clone())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid Oura credentials: {e}"))?;
        if self.lookback_days == 0 {
            return Err("oura.lookback_days must be at least 1".to_string());
        }
        Ok(())
    }
}
