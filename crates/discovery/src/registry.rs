//! Registry types for service discovery
//!
//! This module defines the records produced by a registry import and the
//! filter used to resolve a single service endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry produced by a registry import: a logical service name mapped to
/// a reachable network endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// Logical service name (the cache key downstream)
    pub name: String,

    /// Endpoint the service is reachable at
    pub endpoint: ServiceEndpoint,

    /// When this record was imported
    #[serde(default = "Utc::now")]
    pub imported_at: DateTime<Utc>,
}

impl DiscoveryRecord {
    pub fn new(name: impl Into<String>, endpoint: ServiceEndpoint) -> Self {
        Self {
            name: name.into(),
            endpoint,
            imported_at: Utc::now(),
        }
    }
}

/// A reachable network endpoint for a discovered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,

    /// Whether the endpoint is served over TLS
    #[serde(default)]
    pub ssl: bool,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ssl: false,
        }
    }

    /// Base URL for HTTP requests against this endpoint, without a trailing
    /// slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Filter used to look up a single service in the registry backend.
///
/// The base design only filters by name; the struct exists so richer
/// backends can match on labels without changing the resolution contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFilter {
    pub name: String,
}

impl ServiceFilter {
    /// Build a filter keyed by service name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_base_url() {
        let ep = ServiceEndpoint::new("calc.svc", 8080);
        assert_eq!(ep.base_url(), "http://calc.svc:8080");
    }

    #[test]
    fn test_endpoint_base_url_ssl() {
        let mut ep = ServiceEndpoint::new("calc.svc", 8443);
        ep.ssl = true;
        assert_eq!(ep.base_url(), "https://calc.svc:8443");
    }

    #[test]
    fn test_filter_by_name() {
        let filter = ServiceFilter::by_name("simple-calculator-spring");
        assert_eq!(filter.name, "simple-calculator-spring");
    }

    #[test]
    fn test_record_roundtrip() {
        let record = DiscoveryRecord::new("calc", ServiceEndpoint::new("10.0.0.1", 80));
        let json = serde_json::to_string(&record).unwrap();
        let back: DiscoveryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "calc");
        assert_eq!(back.endpoint, record.endpoint);
    }
}
