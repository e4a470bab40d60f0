//! Configuration model for the Calgate gateway
//!
//! YAML configuration with environment-variable substitution, defaults, and
//! a validation report. See [`parser::load_config`] for the entry point.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub gateway: GatewaySection,
    pub discovery: DiscoverySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Inbound HTTP surface and downstream target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySection {
    /// Host to bind the gateway server to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the gateway server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Service name every proxied path is forwarded to
    pub downstream_service: String,

    /// Optional port for the Prometheus metrics exporter
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Registry backend configuration: master endpoint, credential token, and
/// namespace. Treated as opaque collaborator configuration by the core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoverySection {
    /// Base URL of the registry master
    pub master_url: String,

    /// Optional bearer token for the registry API
    #[serde(default)]
    pub token: Option<String>,

    /// Namespace to scope imports and lookups to
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Logging output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// One of: pretty, json, compact
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
