//! Gateway server and proxy dispatcher for Calgate
//!
//! This crate is the inbound face of the system: an axum HTTP server whose
//! `/api/*` routes are dispatched by method to the discovery-backed request
//! executor, with the completion written back to the original caller.
//!
//! # Modules
//!
//! - [`proxy`] - Method dispatch state machine and response writing
//! - [`server`] - HTTP server lifecycle
//! - [`shutdown`] - Graceful shutdown via `CancellationToken`

pub mod proxy;
pub mod server;
pub mod shutdown;

pub use proxy::{handle_proxy, health_handler, router, DispatchOutcome, ProxyState, JSON_UTF8};
pub use server::{GatewayServer, Result, ServerError};
pub use shutdown::ShutdownController;
