//! Oura webhook HTTP server.
//!
//! Routes:
//! - `GET /health`
//! - `GET /webhook/oura` answers the subscription verification challenge
//! - `POST /webhook/oura` runs a shift when new sleep data is created

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::error::ServerResult;
use crate::runner::{RunRequest, ShiftRunner};
use crate::signals::ShutdownHandle;
use crate::signature::{self, SIGNATURE_HEADER};

/// State shared by all handlers.
#[derive(Debug)]
pub struct WebhookState {
    runner: ShiftRunner,
    config: WebhookConfig,
}

impl WebhookState {
    /// Creates the state.
    pub fn new(runner: ShiftRunner, config: WebhookConfig) -> Self {
        Self { runner, config }
    }

    /// The server configuration.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct ChallengeQuery {
    challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Notification {
    event_type: Option<String>,
    data_type: Option<String>,
}

/// Builds the router.
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/oura", get(verify_challenge).post(notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until SIGTERM or SIGINT.
pub async fn serve(state: Arc<WebhookState>) -> ServerResult<()> {
    state.config.validate()?;
    let listener = TcpListener::bind(state.config.bind).await?;
    let shutdown = ShutdownHandle::new();
    shutdown.spawn_listener();
    serve_on(listener, state, shutdown).await
}

/// Serves on an already bound listener until `shutdown` is triggered.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<WebhookState>,
    shutdown: ShutdownHandle,
) -> ServerResult<()> {
    info!(addr = %listener.local_addr()?, "webhook server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    info!("webhook server stopped");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Local::now().to_rfc3339(),
    }))
}

async fn verify_challenge(Query(query): Query<ChallengeQuery>) -> Json<Value> {
    match query.challenge {
        Some(challenge) => {
            info!(%challenge, "answering verification challenge");
            Json(json!({ "challenge": challenge }))
        }
        None => Json(json!({ "status": "ready" })),
    }
}

async fn notification(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !signature_ok(&state.config, &headers, &body) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    let notification: Notification = match serde_json::from_slice(&body) {
        Ok(n) => n,
        Err(e) => {
            warn!("malformed notification: {e}");
            return error_response(StatusCode::BAD_REQUEST, &format!("invalid JSON: {e}"));
        }
    };
    debug!(
        event_type = ?notification.event_type,
        data_type = ?notification.data_type,
        "received notification"
    );

    let is_new_sleep = notification.data_type.as_deref() == Some("sleep")
        && notification.event_type.as_deref() == Some("create");
    if !is_new_sleep {
        return Json(json!({
            "status": "ignored",
            "reason": "not sleep create event",
        }))
        .into_response();
    }

    info!("new sleep data, running shift");
    let request = RunRequest::today(&state.config.calendar_id);
    let calendar_shift = match state.runner.run(&request).await {
        Ok(outcome) => {
            info!(
                offset = outcome.offset,
                applied = outcome.applied,
                failed = outcome.failed.len(),
                "shift finished"
            );
            true
        }
        Err(e) => {
            error!("shift failed: {e}");
            false
        }
    };

    Json(json!({
        "status": "processed",
        "calendar_shift": calendar_shift,
    }))
    .into_response()
}

/// Unsigned or mis-signed deliveries are only refused when signatures are
/// required; otherwise a bad signature is logged and the delivery accepted.
fn signature_ok(config: &WebhookConfig, headers: &HeaderMap, body: &[u8]) -> bool {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let token = config.verification_token.as_deref().filter(|t| !t.is_empty());

    let valid = match (token, provided) {
        (Some(token), Some(sig)) => signature::verify(token, body, sig),
        _ => false,
    };

    if !valid {
        if config.require_signature {
            warn!(signed = provided.is_some(), "rejecting notification with invalid signature");
            return false;
        }
        if provided.is_some() && token.is_some() {
            warn!("notification signature does not match, accepting anyway");
        }
    }
    true
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
