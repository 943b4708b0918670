//! Command implementations.

pub mod auth;
pub mod config;
pub mod serve;
pub mod shift;
pub mod webhook;

use std::sync::Arc;

use tracing::{debug, info};
use wakeshift_providers::google::GoogleProvider;
use wakeshift_providers::oura::OuraProvider;
use wakeshift_providers::{ErrorProvider, ProviderError, WakeSource};
use wakeshift_server::ShiftRunner;

use crate::config::WakeshiftConfig;
use crate::error::ClientResult;

/// Builds the runner from configuration.
///
/// Google is required. Without an `[oura]` section the wake source is a
/// placeholder that fails when asked, so only runs with a manual offset
/// succeed.
pub fn build_runner(config: &WakeshiftConfig) -> ClientResult<ShiftRunner> {
    let calendar = GoogleProvider::new(config.google()?.to_provider_config()?)?;
    info!(provider = "google", "calendar provider ready");

    let wake: Arc<dyn WakeSource> = match &config.oura {
        Some(oura) => Arc::new(OuraProvider::new(oura.to_provider_config()?)?),
        None => {
            debug!("no [oura] section, wake time must be given with --offset");
            Arc::new(ErrorProvider::new(
                "oura",
                ProviderError::configuration(
                    "Oura is not configured; add an [oura] section or pass --offset",
                )
                .with_provider("oura"),
            ))
        }
    };

    Ok(ShiftRunner::new(Arc::new(calendar), wake).with_policy(config.shift))
}
