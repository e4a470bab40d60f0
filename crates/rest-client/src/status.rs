//! Enumerated upstream status taxonomy
//!
//! The blocking baseline client classifies well-known non-200 statuses into
//! a closed error-kind enum with fixed messages. Statuses outside the
//! enumerated set fall into [`UpstreamStatus::Other`], which reports 500.

use thiserror::Error;

/// Closed taxonomy of well-known upstream statuses.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    #[error("Request accepted.")]
    Accepted,
    #[error("Bad Request.")]
    BadRequest,
    #[error("Unauthorized.")]
    Unauthorized,
    #[error("Forbidden.")]
    Forbidden,
    #[error("Not Found.")]
    NotFound,
    #[error("Method not found.")]
    MethodNotAllowed,
    #[error("Request time out.")]
    RequestTimeout,
    #[error("Precondition failed.")]
    PreconditionFailed,
    #[error("Unsupported media type.")]
    UnsupportedMediaType,
    #[error("Server Exception.")]
    ServerError,
    #[error("Service unavailable.")]
    ServiceUnavailable,
    /// Any status outside the enumerated set; reported as 500 for forward
    /// compatibility with statuses we have never seen.
    #[error("Other exception.")]
    Other,
}

impl UpstreamStatus {
    /// Classify a raw status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            202 => Self::Accepted,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            408 => Self::RequestTimeout,
            412 => Self::PreconditionFailed,
            415 => Self::UnsupportedMediaType,
            500 => Self::ServerError,
            503 => Self::ServiceUnavailable,
            _ => Self::Other,
        }
    }

    /// The status code this kind reports back to callers.
    pub fn code(&self) -> u16 {
        match self {
            Self::Accepted => 202,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::RequestTimeout => 408,
            Self::PreconditionFailed => 412,
            Self::UnsupportedMediaType => 415,
            Self::ServerError | Self::Other => 500,
            Self::ServiceUnavailable => 503,
        }
    }
}
