//! Service discovery and client caching for Calgate
//!
//! This crate owns the process-wide discovery state shared by every proxied
//! call: the readiness flag flipped by the startup import, the imported
//! registry records, and the per-service HTTP client cache.
//!
//! # Modules
//!
//! - [`registry`] - Discovery records, endpoints, and lookup filters
//! - [`backend`] - The pluggable [`DiscoveryBackend`] trait and HTTP backend
//! - [`cache`] - The per-service [`CachedClient`] cache
//!
//! # Quick Start
//!
//! ```ignore
//! use discovery::{Discovery, HttpRegistryBackend, RegistryMasterConfig};
//! use std::sync::Arc;
//!
//! let backend = HttpRegistryBackend::new(RegistryMasterConfig {
//!     master_url: "https://registry.local:6443".into(),
//!     token: None,
//!     namespace: "default".into(),
//! })?;
//!
//! let discovery = Discovery::new(Arc::new(backend));
//! discovery.start_import();
//!
//! // Later, on the request path:
//! let client = discovery.get_or_resolve("simple-calculator-spring").await?;
//! ```

pub mod backend;
pub mod cache;
pub mod registry;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub use backend::{BackendError, DiscoveryBackend, HttpRegistryBackend, RegistryMasterConfig};
pub use cache::{CachedClient, ClientCache, REQUEST_TIMEOUT};
pub use registry::{DiscoveryRecord, ServiceEndpoint, ServiceFilter};

/// Why a client could not be produced for a service name.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The startup import has not completed; no resolution was attempted.
    #[error("discovery not ready")]
    NotReady,

    /// The registry backend failed to resolve the service.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The endpoint resolved but an HTTP client could not be built for it.
    #[error("failed to build client for resolved endpoint: {0}")]
    Client(#[from] reqwest::Error),
}

/// Process-scoped discovery context.
///
/// One instance is created at startup and shared (via `Arc`) by the request
/// executor and the gateway. It carries the only two pieces of cross-call
/// shared state in the system:
///
/// - the readiness flag, written once by the import task (monotonic
///   false -> true, idempotent so races are harmless), and
/// - the client cache, written only on the resolution path.
pub struct Discovery {
    backend: Arc<dyn DiscoveryBackend>,
    ready: AtomicBool,
    records: RwLock<Vec<DiscoveryRecord>>,
    imported_at: RwLock<Option<DateTime<Utc>>>,
    cache: ClientCache,
}

impl Discovery {
    /// Create a discovery context over a registry backend.
    ///
    /// The context starts not-ready; call [`start_import`](Self::start_import)
    /// once to kick off the registry import.
    pub fn new(backend: Arc<dyn DiscoveryBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            ready: AtomicBool::new(false),
            records: RwLock::new(Vec::new()),
            imported_at: RwLock::new(None),
            cache: ClientCache::new(),
        })
    }

    /// Spawn the one-time registry import.
    ///
    /// On success the imported records are stored and the readiness flag
    /// flips true. On failure the cause is logged and the flag stays false;
    /// there is no retry, operators restart the process instead.
    pub fn start_import(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_import().await;
        });
    }

    /// Run the registry import to completion on the current task.
    ///
    /// Exposed separately from [`start_import`](Self::start_import) so tests
    /// and callers that want to await the import directly can do so.
    pub async fn run_import(&self) {
        match self.backend.import().await {
            Ok(records) => {
                info!(count = records.len(), "service registry import complete");
                *self.records.write() = records;
                *self.imported_at.write() = Some(Utc::now());
                self.ready.store(true, Ordering::SeqCst);
            }
            Err(e) => {
                error!(%e, "service registry import failed; gateway stays not-ready");
            }
        }
    }

    /// Whether the startup import has completed successfully.
    ///
    /// The transition is monotonic: once true, never reverts.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// When the import completed, if it has.
    pub fn imported_at(&self) -> Option<DateTime<Utc>> {
        *self.imported_at.read()
    }

    /// Names of the services seen by the import, for diagnostics.
    pub fn known_services(&self) -> Vec<String> {
        self.records.read().iter().map(|r| r.name.clone()).collect()
    }

    /// Get the cached client for `service`, resolving on miss.
    ///
    /// Fails fast with [`ResolveError::NotReady`] while the import is
    /// pending. A miss resolves inline against the backend; concurrent
    /// misses for the same name may each resolve and race to insert, with
    /// the last writer winning. The cache converges to one client per name
    /// and subsequent callers all observe that one client.
    pub async fn get_or_resolve(&self, service: &str) -> Result<CachedClient, ResolveError> {
        if !self.is_ready() {
            return Err(ResolveError::NotReady);
        }

        if let Some(client) = self.cache.get(service) {
            return Ok(client);
        }

        info!(service, "no cached client, resolving via registry");
        let endpoint = self
            .backend
            .resolve(&ServiceFilter::by_name(service))
            .await
            .map_err(|e| {
                warn!(service, %e, "endpoint resolution failed");
                e
            })?;

        let client = CachedClient::connect(service, &endpoint)?;
        self.cache.insert(client.clone());
        Ok(client)
    }

    /// Number of cached clients, for diagnostics.
    pub fn cached_clients(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("ready", &self.is_ready())
            .field("known_services", &self.known_services())
            .field("cached_clients", &self.cached_clients())
            .finish()
    }
}
