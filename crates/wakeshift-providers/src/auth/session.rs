//! Access tokens on demand.

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// Supplies a bearer token for API calls.
///
/// `access_token` must return a token that is valid right now, refreshing
/// stored credentials first when needed.
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently valid access token.
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>>;
}

/// A fixed token, for tests and manually issued personal tokens.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>> {
        let token = self.0.clone();
        Box::pin(async move { Ok(token) })
    }
}

/// Stored OAuth tokens plus the client able to refresh them.
#[derive(Debug)]
pub struct OAuthSession {
    /// Provider name used in messages ("google", "oura").
    provider: &'static str,
    client: OAuthClient,
    storage: TokenStorage,
    refresh_lock: Mutex<()>,
}

impl OAuthSession {
    /// Creates a session over already-loaded storage.
    pub fn new(provider: &'static str, client: OAuthClient, storage: TokenStorage) -> Self {
        Self {
            provider,
            client,
            storage,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Runs the interactive consent flow and stores the new tokens.
    pub async fn authorize(&self) -> ProviderResult<TokenInfo> {
        let tokens = self.client.authorize().await?;
        self.storage.set(tokens.clone())?;
        Ok(tokens)
    }

    /// Returns true if stored tokens are missing or lack a requested scope.
    pub fn needs_reauth(&self) -> bool {
        self.storage.needs_reauth(self.client.scopes())
    }

    /// Returns the token storage.
    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    fn not_authenticated(&self, why: &str) -> ProviderError {
        ProviderError::authentication(format!(
            "{why}, run `wakeshift auth {}`",
            self.provider
        ))
        .with_provider(self.provider)
    }

    async fn valid_token(&self) -> ProviderResult<String> {
        let tokens = self
            .storage
            .get()
            .ok_or_else(|| self.not_authenticated("not authenticated"))?;
        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        // Concurrent callers wait here; the first one refreshes.
        let _guard = self.refresh_lock.lock().await;
        let tokens = self
            .storage
            .get()
            .ok_or_else(|| self.not_authenticated("not authenticated"))?;
        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| self.not_authenticated("access token expired and no refresh token"))?;

        debug!(provider = self.provider, "refreshing expired access token");
        let response = self
            .client
            .refresh(refresh_token)
            .await
            .map_err(|e| e.with_provider(self.provider))?;
        let tokens = self.storage.apply_refresh(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        )?;
        Ok(tokens.access_token)
    }
}

impl CredentialProvider for OAuthSession {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(self.valid_token())
    }
}
