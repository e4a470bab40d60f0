//! Blocking single-shot REST client
//!
//! Comparison baseline for the asynchronous executor: one client per
//! instance, no discovery, no caching. Every non-200 status is classified
//! through the closed [`UpstreamStatus`] taxonomy instead of being wrapped
//! into a payload.

use reqwest::blocking;
use reqwest::Method;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::status::UpstreamStatus;

// The blocking baseline historically ran with a longer budget than the
// async path.
const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the blocking client.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Upstream answered with a non-200 status.
    #[error("upstream status {}: {}", .0.code(), .0)]
    Status(UpstreamStatus),

    /// Connection, timeout, or IO failure.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Single-shot blocking client bound to one base URL.
pub struct BlockingRestClient {
    http: blocking::Client,
    base_url: String,
}

impl BlockingRestClient {
    /// Build a client for `base_url`. Connections are not kept alive, so
    /// every request opens a fresh one.
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        let http = blocking::Client::builder()
            .timeout(SYNC_TIMEOUT)
            .connect_timeout(SYNC_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str, headers: &HashMap<String, String>) -> Result<String, SyncError> {
        self.send(Method::GET, path, headers, None)
    }

    pub fn delete(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
    ) -> Result<String, SyncError> {
        self.send(Method::DELETE, path, headers, None)
    }

    pub fn post(
        &self,
        path: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<String, SyncError> {
        self.send(Method::POST, path, headers, Some(body))
    }

    pub fn put(
        &self,
        path: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<String, SyncError> {
        self.send(Method::PUT, path, headers, Some(body))
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        headers: &HashMap<String, String>,
        body: Option<String>,
    ) -> Result<String, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        info!(%method, %url, "issuing blocking request");

        let mut request = self.http.request(method, &url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SyncError::Status(UpstreamStatus::from_status(
                status.as_u16(),
            )));
        }

        Ok(response.text()?)
    }
}
