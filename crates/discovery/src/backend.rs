//! Registry backend abstraction
//!
//! The [`DiscoveryBackend`] trait is the seam between the discovery context
//! and whatever actually stores service records. The shipped implementation,
//! [`HttpRegistryBackend`], speaks to a registry master over HTTP; tests mock
//! the trait directly.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::registry::{DiscoveryRecord, ServiceEndpoint, ServiceFilter};

/// Errors from a registry backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service not found in registry: {0}")]
    NotFound(String),

    #[error("registry returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// A pluggable service-registry backend.
///
/// `import` is called once at process start to pull every known service;
/// `resolve` is called on a cache miss to look up a single endpoint.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    /// Import all known service records from the registry.
    async fn import(&self) -> Result<Vec<DiscoveryRecord>, BackendError>;

    /// Resolve a single service endpoint matching the filter.
    async fn resolve(&self, filter: &ServiceFilter) -> Result<ServiceEndpoint, BackendError>;
}

/// Opaque configuration for the HTTP registry backend, passed once at
/// adapter startup.
#[derive(Debug, Clone)]
pub struct RegistryMasterConfig {
    /// Base URL of the registry master
    pub master_url: String,

    /// Optional bearer token for the registry API
    pub token: Option<String>,

    /// Namespace to scope imports and lookups to
    pub namespace: String,
}

/// Wire shape of a service entry as returned by the registry master.
#[derive(Debug, Deserialize)]
struct WireService {
    name: String,
    host: String,
    port: u16,
    #[serde(default)]
    ssl: bool,
}

#[derive(Debug, Deserialize)]
struct WireServiceList {
    services: Vec<WireService>,
}

/// Registry backend that queries a registry master over HTTP.
///
/// The master is expected to expose:
/// - `GET /v1/namespaces/{ns}/services` - list all services
/// - `GET /v1/namespaces/{ns}/services/{name}` - look up one service
pub struct HttpRegistryBackend {
    http: reqwest::Client,
    config: RegistryMasterConfig,
}

// Registry lookups are a startup / cache-miss path, not the proxy hot path.
const REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpRegistryBackend {
    pub fn new(config: RegistryMasterConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(REGISTRY_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    fn services_url(&self) -> String {
        format!(
            "{}/v1/namespaces/{}/services",
            self.config.master_url.trim_end_matches('/'),
            self.config.namespace
        )
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.get(url);
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }
        req
    }
}

#[async_trait]
impl DiscoveryBackend for HttpRegistryBackend {
    async fn import(&self) -> Result<Vec<DiscoveryRecord>, BackendError> {
        let url = self.services_url();
        tracing::debug!(%url, "importing services from registry master");

        let response = self.request(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::InvalidResponse(format!(
                "registry master returned {}",
                status
            )));
        }

        let list: WireServiceList = response.json().await?;
        let records = list
            .services
            .into_iter()
            .map(|s| {
                let mut endpoint = ServiceEndpoint::new(s.host, s.port);
                endpoint.ssl = s.ssl;
                DiscoveryRecord::new(s.name, endpoint)
            })
            .collect();

        Ok(records)
    }

    async fn resolve(&self, filter: &ServiceFilter) -> Result<ServiceEndpoint, BackendError> {
        let url = format!("{}/{}", self.services_url(), filter.name);
        tracing::debug!(service = %filter.name, %url, "resolving service endpoint");

        let response = self.request(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(filter.name.clone()));
        }
        if !status.is_success() {
            return Err(BackendError::InvalidResponse(format!(
                "registry master returned {} for {}",
                status, filter.name
            )));
        }

        let service: WireService = response.json().await?;
        let mut endpoint = ServiceEndpoint::new(service.host, service.port);
        endpoint.ssl = service.ssl;
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(master_url: &str) -> HttpRegistryBackend {
        HttpRegistryBackend::new(RegistryMasterConfig {
            master_url: master_url.to_string(),
            token: None,
            namespace: "default".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_services_url() {
        let b = backend("http://registry:6443/");
        assert_eq!(b.services_url(), "http://registry:6443/v1/namespaces/default/services");
    }

    #[tokio::test]
    async fn test_import_against_unreachable_master() {
        // 192.0.2.0/24 is TEST-NET, guaranteed unroutable
        let b = backend("http://192.0.2.1:1");
        let result = b.import().await;
        assert!(matches!(result, Err(BackendError::Http(_))));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        use axum::{http::StatusCode, routing::get, Router};

        let router = Router::new().route(
            "/v1/namespaces/default/services/:name",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let b = backend(&format!("http://{}", addr));
        let result = b.resolve(&ServiceFilter::by_name("missing")).await;
        assert!(matches!(result, Err(BackendError::NotFound(name)) if name == "missing"));
    }
}
