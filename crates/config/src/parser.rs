use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // Perform environment variable substitution before parsing
    let substituted = substitution::substitute_env_vars(&content)?;
    debug!("Environment variable substitution completed");

    let config: GatewayConfig =
        serde_yaml::from_str(&substituted).with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &GatewayConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Generate a configuration with sensible development defaults.
pub fn generate_default_config() -> GatewayConfig {
    GatewayConfig {
        gateway: GatewaySection {
            host: default_host(),
            port: default_port(),
            downstream_service: "simple-calculator-spring".to_string(),
            metrics_port: Some(9090),
        },
        discovery: DiscoverySection {
            master_url: "http://localhost:6443".to_string(),
            token: None,
            namespace: default_namespace(),
        },
        logging: LoggingSection::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = generate_default_config();
        let report = validate_config(&config);
        assert!(report.is_valid(), "default config must validate: {:?}", report.errors);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calgate.yaml");

        let config = generate_default_config();
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.gateway.downstream_service, config.gateway.downstream_service);
        assert_eq!(loaded.discovery.master_url, config.discovery.master_url);
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(load_config("/nonexistent/calgate.yaml").is_err());
    }

    #[test]
    fn test_load_substitutes_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calgate.yaml");
        std::fs::write(
            &path,
            "gateway:\n  downstream_service: calc\ndiscovery:\n  master_url: ${CALGATE_TEST_MASTER}\n",
        )
        .unwrap();

        std::env::set_var("CALGATE_TEST_MASTER", "http://registry:6443");
        let config = load_config(&path).unwrap();
        std::env::remove_var("CALGATE_TEST_MASTER");

        assert_eq!(config.discovery.master_url, "http://registry:6443");
    }
}
