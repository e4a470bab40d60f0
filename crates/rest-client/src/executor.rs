//! Asynchronous proxied-request executor
//!
//! [`RestClient`] issues GET/POST/PUT/DELETE calls against clients resolved
//! through the discovery cache, applies the fixed request timeout, and
//! delivers exactly one [`Completion`] per call through its `Result`.
//!
//! Two warm-up outcomes are deliberately asymmetric and must stay that way:
//!
//! - discovery not ready completes **successfully** with the status-1000
//!   payload, before any cache or network activity;
//! - a cache/resolution failure completes as an **error** whose payload is
//!   status 999. The underlying cause is logged here and never shown to the
//!   caller.

use discovery::{Discovery, REQUEST_TIMEOUT};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::outcome::{classify, Completion, StatusPayload};

/// Status code reported while the discovery import is still pending.
pub const NOT_READY_CODE: u16 = 1000;
/// Message reported while the discovery import is still pending.
pub const NOT_READY_MESSAGE: &str =
    "Service Discovery is not completed, please try after sometime";

/// Status code reported when no client could be obtained for a service.
pub const CACHE_UNAVAILABLE_CODE: u16 = 999;
/// Message reported when no client could be obtained for a service.
pub const CACHE_UNAVAILABLE_MESSAGE: &str = "Unable to load client from Cache";

/// How a proxied call failed.
///
/// These are the only error shapes that cross the executor boundary; raw
/// resolution and transport causes stay behind it.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No client could be obtained from the cache or the registry.
    #[error("{}", CACHE_UNAVAILABLE_MESSAGE)]
    CacheUnavailable,

    /// The call violated an executor precondition before anything was sent.
    #[error("invalid proxied request: {0}")]
    InvalidRequest(String),

    /// Connection, timeout, or IO failure talking to the upstream.
    #[error("upstream transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// The structured payload the dispatcher writes for this failure.
    pub fn payload(&self) -> StatusPayload {
        match self {
            Self::CacheUnavailable => {
                StatusPayload::new(CACHE_UNAVAILABLE_CODE, CACHE_UNAVAILABLE_MESSAGE)
            }
            Self::InvalidRequest(msg) => StatusPayload::new(400, msg.clone()),
            Self::Transport(e) if e.is_timeout() => {
                StatusPayload::new(408, "Upstream request timed out")
            }
            Self::Transport(_) => StatusPayload::new(503, "Upstream service unreachable"),
        }
    }
}

/// Discovery-backed asynchronous REST client.
#[derive(Clone)]
pub struct RestClient {
    discovery: Arc<Discovery>,
}

impl RestClient {
    pub fn new(discovery: Arc<Discovery>) -> Self {
        Self { discovery }
    }

    /// The discovery context this client resolves through.
    pub fn discovery(&self) -> &Arc<Discovery> {
        &self.discovery
    }

    /// Issue a GET against `service`.
    pub async fn get(
        &self,
        service: &str,
        path: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Completion, ClientError> {
        self.execute(Method::GET, service, path, headers, None).await
    }

    /// Issue a DELETE against `service`.
    pub async fn delete(
        &self,
        service: &str,
        path: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Completion, ClientError> {
        self.execute(Method::DELETE, service, path, headers, None)
            .await
    }

    /// Issue a POST with a request body against `service`.
    pub async fn post(
        &self,
        service: &str,
        path: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<Completion, ClientError> {
        self.execute(Method::POST, service, path, headers, Some(body))
            .await
    }

    /// Issue a PUT with a request body against `service`.
    pub async fn put(
        &self,
        service: &str,
        path: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<Completion, ClientError> {
        self.execute(Method::PUT, service, path, headers, Some(body))
            .await
    }

    /// Execute one proxied call and deliver its single completion.
    pub async fn execute(
        &self,
        method: Method,
        service: &str,
        path: &str,
        headers: &HashMap<String, String>,
        body: Option<String>,
    ) -> Result<Completion, ClientError> {
        validate_call(&method, path, body.as_deref())?;

        // Short-circuit before touching the cache: warm-up is reported as a
        // successful completion, not a failure.
        if !self.discovery.is_ready() {
            debug!(service, path, "discovery not ready, short-circuiting");
            return Ok(Completion::status(NOT_READY_CODE, NOT_READY_MESSAGE));
        }

        let client = match self.discovery.get_or_resolve(service).await {
            Ok(client) => client,
            Err(e) => {
                // Opacity boundary: log the cause, surface only the generic
                // cache failure.
                error!(service, path, %e, "failed to obtain client for service");
                return Err(ClientError::CacheUnavailable);
            }
        };

        let mut request = client
            .request(method.clone(), path)
            .timeout(REQUEST_TIMEOUT)
            .headers(build_headers(headers)?);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(service, path, %method, %e, "upstream call failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        debug!(service, path, status = status.as_u16(), "upstream responded");

        let body = response.text().await.map_err(ClientError::Transport)?;
        Ok(classify(status, body))
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("discovery", &self.discovery)
            .finish()
    }
}

/// Check the executor preconditions before anything is resolved or sent.
fn validate_call(method: &Method, path: &str, body: Option<&str>) -> Result<(), ClientError> {
    if *method == Method::GET || *method == Method::DELETE {
        if body.is_some() {
            return Err(ClientError::InvalidRequest(format!(
                "{} requests must not carry a body",
                method
            )));
        }
    } else if *method == Method::POST || *method == Method::PUT {
        if body.is_none() {
            return Err(ClientError::InvalidRequest(format!(
                "{} requests require a body",
                method
            )));
        }
    } else {
        return Err(ClientError::InvalidRequest(format!(
            "unsupported method: {}",
            method
        )));
    }

    if path.is_empty() || !path.starts_with('/') {
        return Err(ClientError::InvalidRequest(format!(
            "path must be non-empty and begin with '/': {:?}",
            path
        )));
    }

    Ok(())
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use axum::routing::{delete, get, post};
    use axum::Router;
    use discovery::{BackendError, DiscoveryBackend, DiscoveryRecord, ServiceEndpoint, ServiceFilter};
    use std::net::SocketAddr;

    /// Backend that resolves every service to one fixed endpoint.
    struct StaticBackend {
        endpoint: ServiceEndpoint,
    }

    #[async_trait]
    impl DiscoveryBackend for StaticBackend {
        async fn import(&self) -> Result<Vec<DiscoveryRecord>, BackendError> {
            Ok(vec![DiscoveryRecord::new("calc", self.endpoint.clone())])
        }

        async fn resolve(&self, _filter: &ServiceFilter) -> Result<ServiceEndpoint, BackendError> {
            Ok(self.endpoint.clone())
        }
    }

    /// Backend whose resolution always fails.
    struct BrokenBackend;

    #[async_trait]
    impl DiscoveryBackend for BrokenBackend {
        async fn import(&self) -> Result<Vec<DiscoveryRecord>, BackendError> {
            Ok(vec![])
        }

        async fn resolve(&self, filter: &ServiceFilter) -> Result<ServiceEndpoint, BackendError> {
            Err(BackendError::NotFound(filter.name.clone()))
        }
    }

    /// Backend that must never be consulted.
    struct PanicBackend;

    #[async_trait]
    impl DiscoveryBackend for PanicBackend {
        async fn import(&self) -> Result<Vec<DiscoveryRecord>, BackendError> {
            panic!("import should not be called");
        }

        async fn resolve(&self, _filter: &ServiceFilter) -> Result<ServiceEndpoint, BackendError> {
            panic!("resolve should not be called");
        }
    }

    async fn spawn_downstream() -> SocketAddr {
        let router = Router::new()
            .route("/api/whoami", get(|| async { "I am served from Host: X" }))
            .route(
                "/api/echo-header",
                get(|headers: axum::http::HeaderMap| async move {
                    headers
                        .get("x-tenant")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("missing")
                        .to_string()
                }),
            )
            .route("/api/add", post(|body: String| async move { body }))
            .route("/api/item", delete(|| async { "deleted" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn ready_client(addr: SocketAddr) -> RestClient {
        let backend = StaticBackend {
            endpoint: ServiceEndpoint::new(addr.ip().to_string(), addr.port()),
        };
        let discovery = Discovery::new(Arc::new(backend));
        discovery.run_import().await;
        RestClient::new(discovery)
    }

    #[tokio::test]
    async fn test_not_ready_completes_with_1000_payload() {
        let discovery = Discovery::new(Arc::new(PanicBackend));
        let client = RestClient::new(discovery);

        let completion = client
            .get("calc", "/api/whoami", &HashMap::new())
            .await
            .unwrap();

        assert_eq!(
            completion,
            Completion::status(NOT_READY_CODE, NOT_READY_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_is_999_error() {
        let discovery = Discovery::new(Arc::new(BrokenBackend));
        discovery.run_import().await;
        let client = RestClient::new(discovery);

        let err = client
            .get("ghost", "/api/whoami", &HashMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, ClientError::CacheUnavailable);
        assert_eq!(
            err.payload(),
            StatusPayload::new(CACHE_UNAVAILABLE_CODE, CACHE_UNAVAILABLE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_get_200_returns_body() {
        let addr = spawn_downstream().await;
        let client = ready_client(addr).await;

        let completion = client
            .get("calc", "/api/whoami", &HashMap::new())
            .await
            .unwrap();

        assert_eq!(
            completion,
            Completion::Body("I am served from Host: X".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_404_is_successful_status_completion() {
        let addr = spawn_downstream().await;
        let client = ready_client(addr).await;

        let completion = client
            .delete("calc", "/api/nope", &HashMap::new())
            .await
            .unwrap();

        assert_eq!(completion, Completion::status(404, "Not Found"));
    }

    #[tokio::test]
    async fn test_post_writes_body() {
        let addr = spawn_downstream().await;
        let client = ready_client(addr).await;

        let body = "{\"numbers\":[5,5,10]}".to_string();
        let completion = client
            .post("calc", "/api/add", body.clone(), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(completion, Completion::Body(body));
    }

    #[tokio::test]
    async fn test_headers_are_attached() {
        let addr = spawn_downstream().await;
        let client = ready_client(addr).await;

        let mut headers = HashMap::new();
        headers.insert("x-tenant".to_string(), "acme".to_string());

        let completion = client
            .get("calc", "/api/echo-header", &headers)
            .await
            .unwrap();

        assert_eq!(completion, Completion::Body("acme".to_string()));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error_completion() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ready_client(addr).await;
        let err = client
            .get("calc", "/api/whoami", &HashMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, ClientError::Transport(_));
        assert_eq!(err.payload().status_code, 503);
    }

    #[tokio::test]
    async fn test_preconditions() {
        let discovery = Discovery::new(Arc::new(PanicBackend));
        let client = RestClient::new(discovery);
        let headers = HashMap::new();

        // Path must begin with '/'
        let err = client
            .execute(Method::GET, "calc", "api/whoami", &headers, None)
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::InvalidRequest(_));

        // POST requires a body
        let err = client
            .execute(Method::POST, "calc", "/api/add", &headers, None)
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::InvalidRequest(_));

        // GET must not carry one
        let err = client
            .execute(Method::GET, "calc", "/api/whoami", &headers, Some("x".into()))
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::InvalidRequest(_));

        // Methods outside the supported set are rejected
        let err = client
            .execute(Method::PATCH, "calc", "/api/whoami", &headers, None)
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::InvalidRequest(_));
    }
}
