//! Graceful shutdown coordination
//!
//! Built on `tokio_util::sync::CancellationToken`: tokens can be cloned and
//! shared, child tokens are cancelled with their parent, and cancellation
//! can be observed without consuming the token.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinates graceful shutdown across the gateway's tasks.
///
/// # Example
///
/// ```ignore
/// let shutdown = ShutdownController::with_ctrl_c();
/// server.run(shutdown.child_token()).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Create a controller that cancels when Ctrl+C is received.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown...");
                    token.cancel();
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        controller
    }

    /// Child token cancelled when this controller shuts down.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger shutdown manually.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Wait until shutdown has been triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_manual_shutdown_cancels_children() {
        let controller = ShutdownController::new();
        let child = controller.child_token();

        controller.shutdown();

        tokio::time::timeout(Duration::from_secs(1), child.cancelled())
            .await
            .expect("child token should be cancelled");
    }

    #[tokio::test]
    async fn test_wait_returns_after_shutdown() {
        let controller = ShutdownController::new();
        let waiter = controller.clone();

        let handle = tokio::spawn(async move { waiter.wait().await });
        controller.shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("wait should return")
            .unwrap();
    }
}
