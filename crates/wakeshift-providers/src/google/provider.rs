//! [`CalendarProvider`] implementation for Google Calendar.

use std::sync::Arc;

use tracing::debug;
use wakeshift_core::{CalendarEvent, TimeWindow, TimedSpan};

use crate::auth::{CredentialProvider, OAuthClient, OAuthSession, TokenStorage};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;

/// Google Calendar provider.
#[derive(Debug)]
pub struct GoogleProvider {
    client: GoogleCalendarClient,
}

impl GoogleProvider {
    /// Creates a provider backed by OAuth tokens stored at the configured
    /// path. Missing tokens only fail at the first API call.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        let session = Self::session(&config)?;
        Self::with_credentials(&config, Arc::new(session))
    }

    /// Creates a provider that takes bearer tokens from `credentials`.
    pub fn with_credentials(
        config: &GoogleConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ProviderResult<Self> {
        let client = GoogleCalendarClient::new(&config.api_base, credentials, config.timeout)
            .map_err(|e| e.with_provider("google"))?;
        Ok(Self { client })
    }

    /// Builds the OAuth session for `config`, used both by the provider and
    /// by `wakeshift auth google`.
    pub fn session(config: &GoogleConfig) -> ProviderResult<OAuthSession> {
        config.validate().map_err(ProviderError::configuration)?;
        let oauth = OAuthClient::new(
            config.credentials.clone(),
            config.endpoints(),
            config.redirect(),
            config.scopes.clone(),
            config.timeout,
        )?;
        let storage = TokenStorage::open(&config.token_path)?;
        Ok(OAuthSession::new("google", oauth, storage))
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn self_identity<'a>(&'a self, calendar_id: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let calendar = self
                .client
                .get_calendar(calendar_id)
                .await
                .map_err(|e| e.with_provider("google"))?;
            debug!(calendar_id, identity = %calendar.id, "resolved calendar owner");
            Ok(calendar.id)
        })
    }

    fn fetch_day_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            self.client
                .list_events(calendar_id, window.start, window.end)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn update_event_times<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        span: &'a TimedSpan,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.client
                .patch_event_times(calendar_id, event_id, span)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::auth::{OAuthCredentials, StaticToken};
    use crate::error::ProviderErrorCode;

    fn config(api_base: &str, token_path: &std::path::Path) -> GoogleConfig {
        GoogleConfig::new(OAuthCredentials::new(
            "test-client.apps.googleusercontent.com",
            "test-secret",
        ))
        .with_token_path(token_path)
        .with_api_base(api_base)
        .with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config("http://127.0.0.1:9", &dir.path().join("t.json"));
        config.credentials.client_id = "nope".into();
        let err = GoogleProvider::new(config).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn unauthenticated_provider_asks_for_auth() {
        let dir = tempfile::tempdir().unwrap();
        let provider =
            GoogleProvider::new(config("http://127.0.0.1:9", &dir.path().join("t.json"))).unwrap();
        let err = provider.self_identity("primary").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("wakeshift auth google"));
    }

    #[tokio::test]
    async fn self_identity_is_calendar_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calendars/primary")
            .with_body(r#"{"id": "me@example.com"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = GoogleProvider::with_credentials(
            &config(&server.url(), &dir.path().join("t.json")),
            Arc::new(StaticToken::new("tok")),
        )
        .unwrap();

        assert_eq!(provider.self_identity("primary").await.unwrap(), "me@example.com");
    }

    #[tokio::test]
    async fn errors_carry_provider_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = GoogleProvider::with_credentials(
            &config(&server.url(), &dir.path().join("t.json")),
            Arc::new(StaticToken::new("tok")),
        )
        .unwrap();

        let start = Utc.with_ymd_and_hms(2025, 2, 5, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + chrono::Duration::days(1));
        let err = provider.fetch_day_events("primary", window).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.provider(), Some("google"));
    }
}
