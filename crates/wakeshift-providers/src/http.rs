//! Request plumbing shared by the Google, Oura and OAuth clients.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, ProviderResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds an HTTP client with the given timeout.
pub(crate) fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("wakeshift/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::internal("failed to create HTTP client").with_source(e))
}

/// Sends a request, mapping transport failures to network errors.
pub(crate) async fn send(request: RequestBuilder) -> ProviderResult<Response> {
    request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timeout".to_string()
        } else if e.is_connect() {
            format!("connection failed: {e}")
        } else {
            format!("request failed: {e}")
        };
        ProviderError::network(message)
    })
}

/// Returns the response unchanged if its status is a success, otherwise an
/// error built from the status and body.
pub(crate) async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::from_status(status.as_u16(), &body))
}

/// Checks the status and parses the body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let response = ensure_success(response).await?;
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {e}")))?;
    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {e}")))
}
