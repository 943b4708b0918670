//! OAuth 2.0 authorization-code flow with a local redirect listener.
//!
//! 1. Start a listener for the redirect URI (a free loopback port, or the
//!    fixed URI registered with the provider)
//! 2. Open the consent page in the browser, with a PKCE challenge when the
//!    provider supports it and a random `state`
//! 3. Read `code` and `state` from the redirect request
//! 4. Exchange the code for tokens
//!
//! Google uses PKCE on a random port; Oura requires the exact redirect URI
//! registered for the application.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::http;

use super::credentials::OAuthCredentials;
use super::tokens::TokenInfo;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long to wait for the browser to come back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Where the provider sends the browser after consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// `http://127.0.0.1:<port>/callback` on the first free port in range.
    Loopback {
        /// Inclusive port range to try.
        port_range: (u16, u16),
    },
    /// A fixed redirect URI; its host must resolve to this machine.
    Fixed(String),
}

/// Static description of a provider's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    /// Consent page URL.
    pub auth_url: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// Whether to send a PKCE challenge.
    pub pkce: bool,
    /// Extra query parameters for the consent page.
    pub extra_auth_params: Vec<(String, String)>,
}

/// OAuth client for one provider.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    endpoints: OAuthEndpoints,
    redirect: RedirectTarget,
    scopes: Vec<String>,
    http_client: reqwest::Client,
}

/// Response from a token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// New refresh token, when the server rotates it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    pub fn new(
        credentials: OAuthCredentials,
        endpoints: OAuthEndpoints,
        redirect: RedirectTarget,
        scopes: Vec<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            credentials,
            endpoints,
            redirect,
            scopes,
            http_client: http::build_client(timeout)?,
        })
    }

    /// Returns the scopes this client requests.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Runs the interactive flow and returns the obtained tokens.
    ///
    /// # Errors
    ///
    /// Fails if no listener can be bound, the user denies consent, the
    /// redirect does not arrive in time, or the token exchange fails.
    pub async fn authorize(&self) -> ProviderResult<TokenInfo> {
        let flow = AuthorizationFlow::new(self.endpoints.pkce);
        let (listener, redirect_uri) = self.bind_redirect_listener()?;

        let auth_url = flow.build_auth_url(
            &self.endpoints,
            &self.credentials.client_id,
            &redirect_uri,
            &self.scopes,
        )?;

        info!("starting OAuth flow, opening browser...");
        debug!(%auth_url, "authorization URL");
        if let Err(e) = open::that(auth_url.as_str()) {
            warn!("failed to open browser: {}", e);
        }
        eprintln!("\nIf the browser does not open, visit:\n\n{auth_url}\n");

        let (code, received_state) = tokio::task::spawn_blocking(move || wait_for_callback(listener))
            .await
            .map_err(|e| ProviderError::internal(format!("callback listener failed: {e}")))??;

        if received_state != flow.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch, the redirect did not come from this flow",
            ));
        }

        info!("received authorization code, exchanging for tokens...");
        let mut params = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        if let Some(verifier) = flow.verifier.as_deref() {
            params.push(("code_verifier", verifier));
        }

        let response = self.token_request(&params).await?;
        info!("successfully obtained tokens");
        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            self.scopes.clone(),
        ))
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> ProviderResult<TokenResponse> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        self.token_request(&params).await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> ProviderResult<TokenResponse> {
        let response =
            http::send(self.http_client.post(&self.endpoints.token_url).form(params)).await?;
        http::read_json(response).await.map_err(|e| {
            ProviderError::authentication(format!("token request failed: {}", e.message()))
        })
    }

    fn bind_redirect_listener(&self) -> ProviderResult<(TcpListener, String)> {
        match &self.redirect {
            RedirectTarget::Loopback { port_range } => {
                for port in port_range.0..=port_range.1 {
                    if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
                        debug!(port, "bound loopback listener");
                        return Ok((listener, format!("http://127.0.0.1:{port}/callback")));
                    }
                }
                Err(ProviderError::configuration(format!(
                    "no available port in range {}-{}",
                    port_range.0, port_range.1
                )))
            }
            RedirectTarget::Fixed(uri) => {
                let url = Url::parse(uri).map_err(|e| {
                    ProviderError::configuration(format!("invalid redirect URI {uri}: {e}"))
                })?;
                let port = url.port_or_known_default().unwrap_or(80);
                let listener = TcpListener::bind(("127.0.0.1", port)).map_err(|e| {
                    ProviderError::configuration(format!("cannot listen on port {port}: {e}"))
                })?;
                Ok((listener, uri.clone()))
            }
        }
    }
}

/// Per-attempt secrets: the CSRF `state` and the optional PKCE pair.
#[derive(Debug)]
struct AuthorizationFlow {
    state: String,
    verifier: Option<String>,
}

impl AuthorizationFlow {
    fn new(pkce: bool) -> Self {
        Self {
            state: random_token(16),
            verifier: pkce.then(|| random_token(CODE_VERIFIER_LENGTH)),
        }
    }

    fn build_auth_url(
        &self,
        endpoints: &OAuthEndpoints,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<Url> {
        let mut url = Url::parse(&endpoints.auth_url).map_err(|e| {
            ProviderError::configuration(format!("invalid authorization URL: {e}"))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &scopes.join(" "))
                .append_pair("state", &self.state);
            if let Some(verifier) = &self.verifier {
                query
                    .append_pair("code_challenge", &pkce_challenge(verifier))
                    .append_pair("code_challenge_method", "S256");
            }
            for (key, value) in &endpoints.extra_auth_params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// SHA-256 of the verifier, base64url without padding (RFC 7636 S256).
fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn wait_for_callback(listener: TcpListener) -> ProviderResult<(String, String)> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(ProviderError::authentication("timed out waiting for the OAuth redirect"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::internal("callback listener stopped"))
        }
    }
}

/// Handles one request on the redirect listener.
///
/// Returns `None` for requests that are not the redirect (favicon probes).
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let result = parse_callback_request(&request_line)?;

    let response = if result.is_ok() {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization successful</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    } else {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization failed</h1>\
        <p>You can close this window.</p></body></html>"
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    Some(result)
}

/// Parses `GET /callback?code=...&state=... HTTP/1.1`.
fn parse_callback_request(request_line: &str) -> Option<ProviderResult<(String, String)>> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    if !target.starts_with("/callback") {
        return None;
    }

    let url = Url::parse(&format!("http://localhost{target}")).ok()?;
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(ProviderError::authentication(format!(
            "authorization denied: {error}"
        ))));
    }
    Some(match code {
        Some(code) => Ok((code, state.unwrap_or_default())),
        None => Err(ProviderError::authentication(
            "missing authorization code in callback",
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(pkce: bool) -> OAuthEndpoints {
        OAuthEndpoints {
            auth_url: "https://accounts.example.com/authorize".into(),
            token_url: "https://accounts.example.com/token".into(),
            pkce,
            extra_auth_params: vec![("access_type".into(), "offline".into())],
        }
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn pkce_verifier_length() {
        let flow = AuthorizationFlow::new(true);
        // 32 bytes base64url without padding
        assert_eq!(flow.verifier.unwrap().len(), 43);
    }

    #[test]
    fn pkce_challenge_known_vector() {
        // RFC 7636 appendix B
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn state_is_random() {
        assert_ne!(AuthorizationFlow::new(false).state, AuthorizationFlow::new(false).state);
    }

    #[test]
    fn auth_url_with_pkce() {
        let flow = AuthorizationFlow::new(true);
        let url = flow
            .build_auth_url(
                &endpoints(true),
                "client",
                "http://127.0.0.1:8080/callback",
                &["a".to_string(), "b".to_string()],
            )
            .unwrap();

        assert_eq!(url.host_str(), Some("accounts.example.com"));
        assert_eq!(query(&url, "scope").as_deref(), Some("a b"));
        assert_eq!(query(&url, "redirect_uri").as_deref(), Some("http://127.0.0.1:8080/callback"));
        assert_eq!(query(&url, "code_challenge_method").as_deref(), Some("S256"));
        assert_eq!(query(&url, "state"), Some(flow.state.clone()));
        assert_eq!(query(&url, "access_type").as_deref(), Some("offline"));
    }

    #[test]
    fn auth_url_without_pkce() {
        let flow = AuthorizationFlow::new(false);
        let url = flow
            .build_auth_url(&endpoints(false), "client", "http://localhost:8080/callback", &[])
            .unwrap();
        assert!(query(&url, "code_challenge").is_none());
        assert_eq!(query(&url, "response_type").as_deref(), Some("code"));
    }

    #[test]
    fn callback_with_code() {
        let result = parse_callback_request("GET /callback?code=abc%2F1&state=xyz HTTP/1.1\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(result, ("abc/1".to_string(), "xyz".to_string()));
    }

    #[test]
    fn callback_with_error() {
        let err = parse_callback_request("GET /callback?error=access_denied HTTP/1.1")
            .unwrap()
            .unwrap_err();
        assert!(err.message().contains("access_denied"));
    }

    #[test]
    fn unrelated_requests_are_ignored() {
        assert!(parse_callback_request("GET /favicon.ico HTTP/1.1").is_none());
        assert!(parse_callback_request("POST /callback HTTP/1.1").is_none());
        assert!(parse_callback_request("").is_none());
    }

    #[tokio::test]
    async fn refresh_posts_refresh_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "r1".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"a2","expires_in":3600}"#)
            .create_async()
            .await;

        let endpoints = OAuthEndpoints {
            token_url: format!("{}/token", server.url()),
            ..endpoints(false)
        };
        let client = OAuthClient::new(
            OAuthCredentials::new("id", "secret"),
            endpoints,
            RedirectTarget::Fixed("http://localhost:8080/callback".into()),
            vec![],
            Duration::from_secs(5),
        )
        .unwrap();

        let response = client.refresh("r1").await.unwrap();
        assert_eq!(response.access_token, "a2");
        assert!(response.refresh_token.is_none());
        assert_eq!(response.expires_in, Some(3600));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_rejection_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let endpoints = OAuthEndpoints {
            token_url: format!("{}/token", server.url()),
            ..endpoints(false)
        };
        let client = OAuthClient::new(
            OAuthCredentials::new("id", "secret"),
            endpoints,
            RedirectTarget::Loopback { port_range: (8080, 8090) },
            vec![],
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.refresh("stale").await.unwrap_err();
        assert_eq!(err.code(), crate::error::ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("invalid_grant"));
    }
}
