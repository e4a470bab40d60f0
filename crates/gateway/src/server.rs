//! Gateway HTTP server
//!
//! Wraps an axum router with lifecycle management: bind, serve, and
//! graceful shutdown through a `CancellationToken`.

use axum::Router;
use parking_lot::RwLock;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind to address {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// HTTP server hosting the gateway router.
///
/// # Example
///
/// ```ignore
/// use gateway::{GatewayServer, ShutdownController};
///
/// let server = GatewayServer::new("0.0.0.0", 8080, router);
/// let shutdown = ShutdownController::with_ctrl_c();
/// server.run(shutdown.child_token()).await?;
/// ```
#[derive(Clone)]
pub struct GatewayServer {
    host: String,
    port: u16,
    router: Router,
    running: Arc<AtomicBool>,
    bound_addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl GatewayServer {
    pub fn new(host: impl Into<String>, port: u16, router: Router) -> Self {
        Self {
            host: host.into(),
            port,
            router,
            running: Arc::new(AtomicBool::new(false)),
            bound_addr: Arc::new(RwLock::new(None)),
        }
    }

    /// The address the server is bound to, once running. With port 0 this is
    /// the ephemeral port the OS picked.
    pub fn address(&self) -> Option<SocketAddr> {
        *self.bound_addr.read()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Serve until the shutdown token is cancelled.
    pub async fn run(&self, shutdown_token: CancellationToken) -> Result<()> {
        let addr = self.bind_addr()?;

        let listener = TcpListener::bind(&addr).await.map_err(|e| ServerError::BindError {
            address: addr.to_string(),
            source: e,
        })?;

        let local_addr = listener.local_addr().map_err(ServerError::Io)?;
        *self.bound_addr.write() = Some(local_addr);
        info!(%local_addr, "Gateway HTTP server listening");

        self.running.store(true, Ordering::SeqCst);

        let result = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown_token.cancelled().await;
                info!("Gateway server received shutdown signal");
            })
            .await;

        self.running.store(false, Ordering::SeqCst);
        *self.bound_addr.write() = None;

        match result {
            Ok(()) => {
                info!("Gateway server shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!(%e, "Gateway server error");
                Err(ServerError::Io(e))
            }
        }
    }
}
