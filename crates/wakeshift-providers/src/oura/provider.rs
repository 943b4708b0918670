//! [`WakeSource`] implementation backed by Oura sleep data.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::info;

use crate::auth::{CredentialProvider, OAuthClient, OAuthSession, TokenStorage};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, WakeSource};

use super::client::OuraClient;
use super::config::OuraConfig;
use super::sleep::select_wake;

/// Oura wake source.
#[derive(Debug)]
pub struct OuraProvider {
    client: OuraClient,
    lookback_days: u32,
}

impl OuraProvider {
    /// Creates a provider backed by OAuth tokens stored at the configured
    /// path.
    pub fn new(config: OuraConfig) -> ProviderResult<Self> {
        let session = Self::session(&config)?;
        Self::with_credentials(&config, Arc::new(session))
    }

    /// Creates a provider that takes bearer tokens from `credentials`.
    pub fn with_credentials(
        config: &OuraConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let client = OuraClient::new(
            &config.api_base,
            credentials,
            config.credentials.clone(),
            config.timeout,
        )
        .map_err(|e| e.with_provider("oura"))?;
        Ok(Self {
            client,
            lookback_days: config.lookback_days,
        })
    }

    /// Builds the OAuth session for `config`, used both by the provider and
    /// by `wakeshift auth oura`.
    pub fn session(config: &OuraConfig) -> ProviderResult<OAuthSession> {
        config.validate().map_err(ProviderError::configuration)?;
        let oauth = OAuthClient::new(
            config.credentials.clone(),
            config.endpoints(),
            config.redirect(),
            config.scopes(),
            config.timeout,
        )?;
        let storage = TokenStorage::open(&config.token_path)?;
        Ok(OAuthSession::new("oura", oauth, storage))
    }

    /// The underlying API client, for webhook subscription management.
    pub fn client(&self) -> &OuraClient {
        &self.client
    }
}

impl WakeSource for OuraProvider {
    fn name(&self) -> &str {
        "oura"
    }

    fn latest_wake(&self, today: NaiveDate) -> BoxFuture<'_, ProviderResult<Option<DateTime<Utc>>>> {
        Box::pin(async move {
            let start = today
                .checked_sub_days(Days::new(u64::from(self.lookback_days)))
                .unwrap_or(today);
            let sessions = self
                .client
                .sleep_sessions(start, today)
                .await
                .map_err(|e| e.with_provider("oura"))?;

            let wake = select_wake(&sessions, today);
            match wake {
                Some(at) => info!(wake = %at, sessions = sessions.len(), "found wake time"),
                None => info!(%start, %today, "no sleep data in range"),
            }
            Ok(wake)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::TimeZone;
    use mockito::Matcher;

    use crate::auth::{OAuthCredentials, StaticToken};
    use crate::error::ProviderErrorCode;

    fn provider(base: &str) -> OuraProvider {
        let config = OuraConfig::new(OAuthCredentials::new("cid", "csecret"))
            .with_api_base(base)
            .with_timeout(Duration::from_secs(5));
        OuraProvider::with_credentials(&config, Arc::new(StaticToken::new("tok"))).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 5).unwrap()
    }

    #[tokio::test]
    async fn queries_lookback_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/usercollection/sleep")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start_date".into(), "2025-02-02".into()),
                Matcher::UrlEncoded("end_date".into(), "2025-02-05".into()),
            ]))
            .with_body(
                r#"{"data": [
                    {"bedtime_end": "2025-02-04T07:30:00+01:00"},
                    {"bedtime_end": "2025-02-05T09:00:00+01:00"}
                ]}"#,
            )
            .create_async()
            .await;

        let wake = provider(&server.url()).latest_wake(today()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(wake, Some(Utc.with_ymd_and_hms(2025, 2, 5, 8, 0, 0).unwrap()));
    }

    #[tokio::test]
    async fn empty_range_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/usercollection/sleep")
            .match_query(Matcher::Any)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        assert_eq!(provider(&server.url()).latest_wake(today()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn errors_carry_provider_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/usercollection/sleep")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let err = provider(&server.url()).latest_wake(today()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert_eq!(err.provider(), Some("oura"));
    }

    #[tokio::test]
    async fn unauthenticated_session_asks_for_auth() {
        let dir = tempfile::tempdir().unwrap();
        let config = OuraConfig::new(OAuthCredentials::new("cid", "csecret"))
            .with_token_path(dir.path().join("oura.json"))
            .with_api_base("http://127.0.0.1:9");
        let provider = OuraProvider::new(config).unwrap();
        let err = provider.latest_wake(today()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("wakeshift auth oura"));
    }
}
