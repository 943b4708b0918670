//! Oura API client: sleep sessions and webhook subscriptions.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{CredentialProvider, OAuthCredentials};
use crate::error::ProviderResult;
use crate::http;

use super::sleep::SleepSession;

/// Oura API client.
///
/// Sleep data needs only the bearer token. Webhook management additionally
/// authenticates the application with `x-client-id` and `x-client-secret`.
pub struct OuraClient {
    http_client: reqwest::Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
    app: OAuthCredentials,
}

impl std::fmt::Debug for OuraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OuraClient")
            .field("api_base", &self.api_base)
            .field("client_id", &self.app.client_id)
            .finish_non_exhaustive()
    }
}

/// A webhook subscription as returned by the Oura API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhookSubscription {
    pub id: String,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub expiration_time: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewSubscription<'a> {
    callback_url: &'a str,
    verification_token: &'a str,
    event_type: &'a str,
    data_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// The subscription list comes either bare or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubscriptionList {
    Bare(Vec<WebhookSubscription>),
    Wrapped(Collection<WebhookSubscription>),
}

impl From<SubscriptionList> for Vec<WebhookSubscription> {
    fn from(list: SubscriptionList) -> Self {
        match list {
            SubscriptionList::Bare(subs) => subs,
            SubscriptionList::Wrapped(c) => c.data,
        }
    }
}

impl OuraClient {
    /// Creates a new client.
    pub fn new(
        api_base: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        app: OAuthCredentials,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            app,
        })
    }

    fn subscription_url(&self) -> String {
        format!("{}/v2/webhook/subscription", self.api_base)
    }

    async fn webhook_request(
        &self,
        method: reqwest::Method,
        url: String,
    ) -> ProviderResult<reqwest::RequestBuilder> {
        let token = self.credentials.access_token().await?;
        Ok(self
            .http_client
            .request(method, url)
            .bearer_auth(token)
            .header("x-client-id", &self.app.client_id)
            .header("x-client-secret", &self.app.client_secret))
    }

    /// Fetches sleep sessions dated within `[start, end]`.
    pub async fn sleep_sessions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProviderResult<Vec<SleepSession>> {
        let token = self.credentials.access_token().await?;
        let request = self
            .http_client
            .get(format!("{}/v2/usercollection/sleep", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ]);

        let body: Collection<SleepSession> = http::read_json(http::send(request).await?).await?;
        debug!(%start, %end, count = body.data.len(), "fetched sleep sessions");
        Ok(body.data)
    }

    /// Lists existing webhook subscriptions.
    pub async fn list_subscriptions(&self) -> ProviderResult<Vec<WebhookSubscription>> {
        let request = self
            .webhook_request(reqwest::Method::GET, self.subscription_url())
            .await?;
        let list: SubscriptionList = http::read_json(http::send(request).await?).await?;
        Ok(list.into())
    }

    /// Subscribes `callback_url` to sleep `create` events. Oura signs
    /// deliveries with `verification_token`.
    pub async fn create_subscription(
        &self,
        callback_url: &str,
        verification_token: &str,
    ) -> ProviderResult<WebhookSubscription> {
        let body = NewSubscription {
            callback_url,
            verification_token,
            event_type: "create",
            data_type: "sleep",
        };
        let request = self
            .webhook_request(reqwest::Method::POST, self.subscription_url())
            .await?
            .json(&body);
        let sub: WebhookSubscription = http::read_json(http::send(request).await?).await?;
        debug!(id = %sub.id, callback_url, "created webhook subscription");
        Ok(sub)
    }

    /// Deletes a webhook subscription.
    pub async fn delete_subscription(&self, id: &str) -> ProviderResult<()> {
        let url = format!("{}/{}", self.subscription_url(), urlencoding::encode(id));
        let request = self.webhook_request(reqwest::Method::DELETE, url).await?;
        http::ensure_success(http::send(request).await?).await?;
        debug!(id, "deleted webhook subscription");
        Ok(())
    }
}
