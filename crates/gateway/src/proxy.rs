//! Proxy dispatcher
//!
//! The externally facing entry point: routes an inbound call by HTTP method
//! to the matching executor operation and writes the single completion back
//! to the original caller as JSON.
//!
//! The method state machine is terminal on the first branch taken:
//!
//! - `GET` (and any unrecognized method, the default branch) and `DELETE`
//!   proxy to the configured downstream service with the inbound path;
//! - `POST` and `PUT` are an intentional stub: accepted, dispatched to
//!   [`DispatchOutcome::NotImplemented`], and answered with an empty body so
//!   the gap is explicit and assertable.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Json;
use chrono::Utc;
use observability::GatewayMetrics;
use rest_client::{ClientError, Completion, RestClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Content type written on every proxied response.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Shared dispatcher state: the executor and the fixed downstream service
/// name every inbound path is proxied to.
pub struct ProxyState {
    rest: RestClient,
    downstream: String,
    metrics: GatewayMetrics,
}

impl ProxyState {
    pub fn new(rest: RestClient, downstream: impl Into<String>) -> Self {
        Self {
            rest,
            downstream: downstream.into(),
            metrics: GatewayMetrics::new(),
        }
    }

    pub fn downstream(&self) -> &str {
        &self.downstream
    }
}

/// Result of routing one inbound call through the method state machine.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The call was proxied and completed (successfully or not).
    Proxied(Result<Completion, ClientError>),

    /// The method is accepted but deliberately unimplemented (POST/PUT).
    NotImplemented,
}

/// Build the gateway router over shared dispatcher state.
pub fn router(state: Arc<ProxyState>) -> axum::Router {
    axum::Router::new()
        .route("/api/*path", any(handle_proxy))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle one inbound call: log it, dispatch by method, write the result.
///
/// Body extraction is enabled generically; GET/DELETE ignore it.
pub async fn handle_proxy(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    _body: String,
) -> Response {
    let path = uri.path();
    info!(%method, path, "Handling proxy request");

    let start = Instant::now();
    let outcome = dispatch(&state, &method, path).await;

    let response = write_outcome(outcome);
    state
        .metrics
        .record_dispatch(method.as_str(), response.1, start.elapsed());
    response.0
}

async fn dispatch(state: &ProxyState, method: &Method, path: &str) -> DispatchOutcome {
    let headers = HashMap::new();

    if *method == Method::DELETE {
        DispatchOutcome::Proxied(state.rest.delete(&state.downstream, path, &headers).await)
    } else if *method == Method::POST || *method == Method::PUT {
        info!(%method, path, "method accepted but not implemented");
        DispatchOutcome::NotImplemented
    } else {
        // GET, and the default branch for anything unrecognized
        DispatchOutcome::Proxied(state.rest.get(&state.downstream, path, &headers).await)
    }
}

/// Write the dispatch outcome back to the caller.
///
/// Every proxied outcome becomes a well-formed JSON body with the utf-8
/// content type; only the POST/PUT stub answers empty. Returns the response
/// together with the normalized status recorded in metrics.
fn write_outcome(outcome: DispatchOutcome) -> (Response, u16) {
    match outcome {
        DispatchOutcome::Proxied(Ok(completion)) => {
            let status = match &completion {
                Completion::Body(_) => 200,
                Completion::Status(payload) => payload.status_code,
            };
            (json_response(&completion), status)
        }
        DispatchOutcome::Proxied(Err(e)) => {
            let payload = e.payload();
            error!(status = payload.status_code, %e, "proxied call failed");
            (json_response(&payload), payload.status_code)
        }
        DispatchOutcome::NotImplemented => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::OK.into_response());
            (response, 200)
        }
    }
}

fn json_response<T: serde::Serialize>(value: &T) -> Response {
    ([(CONTENT_TYPE, JSON_UTF8)], Json(value)).into_response()
}

/// Liveness endpoint reporting discovery readiness alongside the usual
/// service metadata.
pub async fn health_handler(State(state): State<Arc<ProxyState>>) -> Json<serde_json::Value> {
    let discovery = state.rest.discovery();
    Json(json!({
        "status": "ok",
        "service": "calgate",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "discovery_ready": discovery.is_ready(),
        "cached_clients": discovery.cached_clients(),
    }))
}
