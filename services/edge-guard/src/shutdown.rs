//! Graceful Shutdown Module
//!
//! Provides a shutdown trigger shared with the server and OS signal handling.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shutdown coordinator for graceful termination
#[derive(Debug)]
pub struct ShutdownCoordinator {
    shutdown_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator
    #[must_use]
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// Gets a shutdown receiver
    #[must_use]
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.shutdown_tx.subscribe(),
        }
    }

    /// Signals every subscriber. Later subscribers see the signal at once.
    pub fn trigger(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true once [`ShutdownCoordinator::trigger`] has been called
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Shutdown signal receiver
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal. Also returns if the coordinator is
    /// dropped.
    pub async fn recv(mut self) {
        let _ = self.receiver.wait_for(|triggered| *triggered).await;
    }
}

/// Waits for SIGTERM or SIGINT
///
/// A handler that cannot be installed is logged and never fires.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Runs a server until it stops or `signal` fires, then gives it
/// `shutdown_timeout` to drain before aborting it.
///
/// The server must stop on its own once `coordinator` is triggered, for
/// example through `axum::serve(..).with_graceful_shutdown(signal.recv())`.
pub async fn run_with_graceful_shutdown<F, G>(
    server: F,
    signal: G,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
) where
    F: Future<Output = io::Result<()>> + Send + 'static,
    G: Future<Output = ()>,
{
    let mut task = tokio::spawn(server);

    tokio::select! {
        result = &mut task => {
            match result {
                Ok(Ok(())) => info!("Server stopped normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task failed"),
            }
            return;
        }
        () = signal => {
            info!("Shutdown signal received");
        }
    }

    coordinator.trigger();
    match tokio::time::timeout(shutdown_timeout, &mut task).await {
        Ok(Ok(Ok(()))) => info!("Server drained gracefully"),
        Ok(Ok(Err(e))) => error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => warn!(error = %e, "Server task failed during shutdown"),
        Err(_) => {
            warn!("Shutdown timeout reached, aborting server");
            task.abort();
        }
    }
    info!("Shutdown complete");
}
