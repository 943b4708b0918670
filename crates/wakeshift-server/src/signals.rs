//! Shutdown signalling for the webhook server.
//!
//! SIGTERM and SIGINT (Ctrl-C elsewhere) trigger a graceful shutdown; the
//! same trigger is available programmatically through [`ShutdownHandle`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

/// A cloneable handle for triggering or awaiting shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    /// Creates a handle that has not been triggered.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Triggers a shutdown.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Returns true if shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once shutdown has been triggered.
    pub async fn wait(self) {
        let mut rx = self.rx;
        // Err means every sender is gone, which cannot be distinguished from
        // a shutdown.
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Spawns a task that triggers this handle on SIGTERM or SIGINT.
    #[cfg(unix)]
    pub fn spawn_listener(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        error!("failed to install signal handlers: {e}");
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
            }
            handle.trigger();
            debug!("signal listener stopped");
        });
    }

    /// Spawns a task that triggers this handle on Ctrl-C.
    #[cfg(not(unix))]
    pub fn spawn_listener(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received Ctrl-C, shutting down");
                handle.trigger();
            }
        });
    }
}
