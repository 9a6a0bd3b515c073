//! Host event pump
//!
//! Gives the host a bounded window to process its own events while the
//! application polls for progress, and reports whether shutdown was requested.
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[async_trait]
pub trait EventPump: Send {
    /// Process pending events for up to `timeout`; `true` once shutdown was requested
    async fn process_events(&mut self, timeout: Duration) -> bool;
}

/// Requests shutdown of a [`SignalEventPump`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn request_shutdown(&self) {
        // send_replace succeeds even with no live receivers
        self.tx.send_replace(true);
    }
}

/// Event pump driven by a shutdown flag
///
/// Once shutdown has been observed every later call returns `true`
/// immediately.
pub struct SignalEventPump {
    rx: watch::Receiver<bool>,
    _tx: watch::Sender<bool>,
}

impl SignalEventPump {
    /// Pump plus a handle that can request shutdown
    pub fn manual() -> (Self, ShutdownHandle) {
        let (tx, rx) = watch::channel(false);
        let handle = ShutdownHandle { tx: tx.clone() };
        (Self { rx, _tx: tx }, handle)
    }

    /// Pump that observes ctrl-c and, on unix, SIGTERM
    pub fn install() -> Self {
        let (pump, handle) = Self::manual();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            handle.request_shutdown();
        });
        pump
    }
}

#[async_trait]
impl EventPump for SignalEventPump {
    async fn process_events(&mut self, timeout: Duration) -> bool {
        if *self.rx.borrow_and_update() {
            return true;
        }

        match tokio::time::timeout(timeout, self.rx.changed()).await {
            Ok(Ok(())) => *self.rx.borrow_and_update(),
            _ => false,
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for ctrl-c");
                    }
                }
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
