//! `wakeshift serve`: run the webhook server in the foreground.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use wakeshift_server::WebhookState;

use crate::config::WakeshiftConfig;
use crate::error::ClientResult;

/// Serves until SIGTERM or SIGINT.
pub async fn run(
    bind: Option<SocketAddr>,
    calendar: Option<String>,
    config: &WakeshiftConfig,
) -> ClientResult<()> {
    let mut server_config = config
        .webhook
        .to_server_config(config.calendar_id(calendar.as_deref()))?;
    if let Some(bind) = bind {
        server_config.bind = bind;
    }
    server_config.validate()?;

    let runner = super::build_runner(config)?;
    info!(
        bind = %server_config.bind,
        calendar_id = %server_config.calendar_id,
        require_signature = server_config.require_signature,
        "starting webhook server"
    );

    wakeshift_server::serve(Arc::new(WebhookState::new(runner, server_config))).await?;
    Ok(())
}
