//! Observability infrastructure for Calgate
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics and gateway-specific metric helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("calgate", LogFormat::Pretty)?;
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, GatewayMetrics};
