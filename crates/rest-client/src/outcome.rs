//! Normalized request outcomes
//!
//! Every proxied call completes with a [`Completion`]: either the raw
//! upstream body, or a structured `{statusCode, statusMessage}` payload for
//! anything the normalizer does not pass through verbatim. Both arms
//! serialize to the exact JSON the caller expects.

use serde::{Deserialize, Serialize};

/// Structured status payload written to callers for non-body outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(rename = "statusMessage")]
    pub status_message: String,
}

impl StatusPayload {
    pub fn new(status_code: u16, status_message: impl Into<String>) -> Self {
        Self {
            status_code,
            status_message: status_message.into(),
        }
    }
}

/// The single completion delivered for a proxied call.
///
/// Serializes untagged: `Body` becomes a JSON string, `Status` becomes the
/// `{statusCode, statusMessage}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Completion {
    /// Upstream replied 200; the raw response body.
    Body(String),

    /// Anything else: a classified status payload. Note this is still a
    /// *successful* completion; only transport-level failures complete the
    /// call as an error.
    Status(StatusPayload),
}

impl Completion {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status(StatusPayload::new(code, message))
    }
}

/// Classify an upstream response into a completion.
///
/// Only 200 passes the body through; every other status is wrapped into a
/// status payload carrying the upstream code and status line.
pub fn classify(status: reqwest::StatusCode, body: String) -> Completion {
    if status == reqwest::StatusCode::OK {
        Completion::Body(body)
    } else {
        Completion::status(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
        )
    }
}
