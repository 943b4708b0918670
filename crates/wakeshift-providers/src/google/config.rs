//! Google Calendar provider configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{OAuthCredentials, OAuthEndpoints, RedirectTarget};
use crate::http::DEFAULT_TIMEOUT;

/// Google OAuth endpoints.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials from Google Cloud Console.
    pub credentials: OAuthCredentials,

    /// Path to store OAuth tokens.
    ///
    /// Defaults to `~/.local/share/wakeshift/google-tokens.json`.
    pub token_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,

    /// Port range for the loopback OAuth listener.
    pub loopback_port_range: (u16, u16),

    /// OAuth scopes to request. Moving events needs read-write access.
    pub scopes: Vec<String>,

    /// API base URL, overridable for tests.
    pub api_base: String,
}

impl GoogleConfig {
    /// Read-write calendar scope.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Creates a new Google configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_path: Self::default_token_path(),
            timeout: DEFAULT_TIMEOUT,
            loopback_port_range: (8085, 8095),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            api_base: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Returns the default token storage path.
    pub fn default_token_path() -> PathBuf {
        crate::data_dir().join("google-tokens.json")
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
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

    /// OAuth endpoints: PKCE, offline access, forced consent so a refresh
    /// token is always issued.
    pub fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            pkce: true,
            extra_auth_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        }
    }

    /// Redirect target for the consent flow.
    pub fn redirect(&self) -> RedirectTarget {
        RedirectTarget::Loopback {
            port_range: self.loopback_port_range,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid Google credentials: {e}"))?;

        if !self.credentials.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("Google client_id should end with .apps.googleusercontent.com".to_string());
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err("invalid loopback port range".to_string());
        }

        Ok(())
    }
}
