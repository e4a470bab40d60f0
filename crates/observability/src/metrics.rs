//! Prometheus metrics infrastructure
//!
//! This module provides the metrics exporter and the gateway-specific
//! metric set recorded on every dispatched proxy call.

use metrics::{counter, histogram, Counter, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP server on the given port exposing metrics at `/metrics`.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9090)?;
/// // Metrics available at http://localhost:9090/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Metric set for the proxy dispatcher.
///
/// # Metrics
///
/// * `gateway_requests_total` - Total proxied calls dispatched
/// * `gateway_requests_by_method` - Dispatched calls, labelled by method
/// * `gateway_upstream_status` - Normalized outcome statuses, labelled by code
/// * `gateway_request_duration_seconds` - End-to-end dispatch duration
#[derive(Clone)]
pub struct GatewayMetrics {
    requests_total: Counter,
    requests_by_method: fn(&str) -> Counter,
    upstream_status: fn(u16) -> Counter,
    request_duration: Histogram,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: counter!("gateway_requests_total"),
            requests_by_method: |method| {
                counter!("gateway_requests_by_method", "method" => method.to_string())
            },
            upstream_status: |status| {
                counter!("gateway_upstream_status", "status" => status.to_string())
            },
            request_duration: histogram!("gateway_request_duration_seconds"),
        }
    }

    /// Record one dispatched call.
    ///
    /// `status` is the normalized status written to the caller (200 for a
    /// body completion, the payload code otherwise).
    pub fn record_dispatch(&self, method: &str, status: u16, duration: Duration) {
        self.requests_total.increment(1);
        (self.requests_by_method)(method).increment(1);
        (self.upstream_status)(status).increment(1);
        self.request_duration.record(duration.as_secs_f64());
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_metrics_record_without_recorder() {
        // With no recorder installed these are no-ops; just verify the
        // handles can be created and used.
        let metrics = GatewayMetrics::new();
        metrics.record_dispatch("GET", 200, Duration::from_millis(5));
        metrics.record_dispatch("DELETE", 404, Duration::from_millis(1));
    }
}
