//! Per-service HTTP client cache
//!
//! Maps a service name to a previously resolved [`CachedClient`]. The cache
//! is a plain map behind an `RwLock`: misses are a normal branch, entries are
//! never evicted, and concurrent misses for the same name may each resolve
//! independently with the last insert winning. The map always converges to a
//! single entry per name.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

use crate::registry::ServiceEndpoint;

/// Fixed timeout applied to every request issued through a cached client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A live HTTP client bound to one service name.
///
/// Cloning is cheap: `reqwest::Client` is an `Arc` around a connection pool,
/// so clones observed by callers all share the cached connections.
#[derive(Debug, Clone)]
pub struct CachedClient {
    service: String,
    base_url: String,
    http: reqwest::Client,
}

impl CachedClient {
    /// Build a client for a resolved endpoint.
    pub fn connect(service: impl Into<String>, endpoint: &ServiceEndpoint) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            service: service.into(),
            base_url: endpoint.base_url(),
            http,
        })
    }

    /// The service name this client is bound to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Base URL of the resolved endpoint, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request against `path` (which must begin with `/`).
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }
}

/// Service name -> client map shared by every concurrent call.
#[derive(Default)]
pub struct ClientCache {
    clients: RwLock<HashMap<String, CachedClient>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a client by service name.
    pub fn get(&self, service: &str) -> Option<CachedClient> {
        self.clients.read().get(service).cloned()
    }

    /// Insert a resolved client, replacing any racing insert for the same
    /// name (last writer wins).
    pub fn insert(&self, client: CachedClient) {
        self.clients
            .write()
            .insert(client.service.clone(), client);
    }

    /// Number of cached clients.
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}
