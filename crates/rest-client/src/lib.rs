//! Discovery-backed REST clients for Calgate
//!
//! This crate performs the proxied HTTP calls and normalizes their outcomes.
//!
//! # Modules
//!
//! - [`executor`] - The asynchronous [`RestClient`] and its error boundary
//! - [`outcome`] - [`Completion`] / [`StatusPayload`] normalization
//! - [`status`] - Closed taxonomy of well-known upstream statuses
//! - [`sync`] - Blocking single-shot baseline client

pub mod executor;
pub mod outcome;
pub mod status;
pub mod sync;

pub use executor::{
    ClientError, RestClient, CACHE_UNAVAILABLE_CODE, CACHE_UNAVAILABLE_MESSAGE, NOT_READY_CODE,
    NOT_READY_MESSAGE,
};
pub use outcome::{classify, Completion, StatusPayload};
pub use status::UpstreamStatus;
pub use sync::{BlockingRestClient, SyncError};
