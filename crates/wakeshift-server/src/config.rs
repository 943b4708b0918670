//! Webhook server configuration.

use std::net::SocketAddr;

use crate::error::{ServerError, ServerResult};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5050";

/// Webhook server configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// Calendar shifted when a notification arrives.
    pub calendar_id: String,

    /// Token shared with Oura when the subscription was created. Keys the
    /// `X-Oura-Signature` HMAC.
    pub verification_token: Option<String>,

    /// Reject notifications without a valid signature.
    pub require_signature: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5050)),
            calendar_id: "primary".to_string(),
            verification_token: None,
            require_signature: false,
        }
    }
}

impl WebhookConfig {
    /// Creates a configuration listening on `bind`.
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Default::default()
        }
    }

    /// Builder: set the calendar to shift.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Builder: set the verification token.
    pub fn with_verification_token(mut self, token: impl Into<String>) -> Self {
        self.verification_token = Some(token.into());
        self
    }

    /// Builder: require signed notifications.
    pub fn with_require_signature(mut self, require: bool) -> Self {
        self.require_signature = require;
        self
    }

    /// Checks that signature enforcement has a key to verify with.
    pub fn validate(&self) -> ServerResult<()> {
        let has_token = self
            .verification_token
            .as_deref()
            .is_some_and(|t| !t.is_empty());
        if self.require_signature && !has_token {
            return Err(ServerError::config(
                "webhook.require_signature needs webhook.verification_token",
            ));
        }
        if self.calendar_id.is_empty() {
            return Err(ServerError::config("calendar id must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = WebhookConfig::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.calendar_id, "primary");
        assert!(!config.require_signature);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_config() {
        let config = WebhookConfig::new("127.0.0.1:8000".parse().unwrap())
            .with_calendar_id("me@example.com")
            .with_verification_token("s3cret")
            .with_require_signature(true);

        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.calendar_id, "me@example.com");
        assert_eq!(config.verification_token.as_deref(), Some("s3cret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn signature_requires_token() {
        let config = WebhookConfig::default().with_require_signature(true);
        assert!(matches!(config.validate(), Err(ServerError::Config { .. })));

        let empty = config.with_verification_token("");
        assert!(empty.validate().is_err());
    }
}
