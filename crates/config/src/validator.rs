use crate::*;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Gateway host is required")]
    MissingHost,

    #[error("Downstream service name is required")]
    MissingDownstreamService,

    #[error("Discovery master_url is required")]
    MissingMasterUrl,

    #[error("Discovery master_url is not a valid URL: {0}")]
    InvalidMasterUrl(String),

    #[error("Discovery master_url must use http or https, got: {0}")]
    UnsupportedMasterScheme(String),

    #[error("Discovery namespace is required")]
    MissingNamespace,

    #[error("Unknown log format: {0}. Must be one of: pretty, json, compact")]
    UnknownLogFormat(String),

    #[error("Unresolved environment placeholder in {field}: {value}")]
    UnresolvedPlaceholder { field: String, value: String },
}

/// A non-fatal validation finding.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// Outcome of validating a configuration: hard errors plus warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.into(),
            message: message.into(),
        });
    }
}

/// Validate a gateway configuration.
pub fn validate_config(config: &GatewayConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.gateway.host.trim().is_empty() {
        report.errors.push(ValidationError::MissingHost);
    }

    if config.gateway.downstream_service.trim().is_empty() {
        report.errors.push(ValidationError::MissingDownstreamService);
    }

    validate_master_url(&config.discovery.master_url, &mut report);

    if config.discovery.namespace.trim().is_empty() {
        report.errors.push(ValidationError::MissingNamespace);
    }

    if let Some(token) = &config.discovery.token {
        if has_unresolved_env_vars(token) {
            report.errors.push(ValidationError::UnresolvedPlaceholder {
                field: "discovery.token".to_string(),
                value: token.clone(),
            });
        }
    } else {
        report.warn(
            "discovery.token",
            "no registry token configured; the registry master must allow anonymous access",
        );
    }

    let format = &config.logging.format;
    if !matches!(format.to_lowercase().as_str(), "pretty" | "json" | "compact") {
        report
            .errors
            .push(ValidationError::UnknownLogFormat(format.clone()));
    }

    if config.gateway.metrics_port.is_none() {
        report.warn("gateway.metrics_port", "metrics exporter disabled");
    }

    report
}

fn validate_master_url(master_url: &str, report: &mut ValidationReport) {
    if master_url.trim().is_empty() {
        report.errors.push(ValidationError::MissingMasterUrl);
        return;
    }

    if has_unresolved_env_vars(master_url) {
        report.errors.push(ValidationError::UnresolvedPlaceholder {
            field: "discovery.master_url".to_string(),
            value: master_url.to_string(),
        });
        return;
    }

    match Url::parse(master_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => {
            report
                .errors
                .push(ValidationError::UnsupportedMasterScheme(url.scheme().to_string()));
        }
        Err(_) => {
            report
                .errors
                .push(ValidationError::InvalidMasterUrl(master_url.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        generate_default_config()
    }

    #[test]
    fn test_valid_config_passes() {
        let report = validate_config(&valid_config());
        assert!(report.is_valid());
    }

    #[test]
    fn test_empty_downstream_service_fails() {
        let mut config = valid_config();
        config.gateway.downstream_service = String::new();
        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingDownstreamService)));
    }

    #[test]
    fn test_bad_master_url_fails() {
        let mut config = valid_config();
        config.discovery.master_url = "not a url".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidMasterUrl(_))));
    }

    #[test]
    fn test_non_http_scheme_fails() {
        let mut config = valid_config();
        config.discovery.master_url = "ftp://registry:21".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnsupportedMasterScheme(_))));
    }

    #[test]
    fn test_unresolved_placeholder_fails() {
        let mut config = valid_config();
        config.discovery.master_url = "${CALGATE_MASTER_URL}".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnresolvedPlaceholder { .. })));
    }

    #[test]
    fn test_unknown_log_format_fails() {
        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownLogFormat(_))));
    }

    #[test]
    fn test_missing_token_is_only_a_warning() {
        let mut config = valid_config();
        config.discovery.token = None;
        let report = validate_config(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "discovery.token"));
    }
}
