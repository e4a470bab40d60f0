//! Calgate CLI and gateway binary
//!
//! Entry point for the gateway: provides commands for initializing and
//! validating configuration and for starting the proxy server.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{generate_default_config, load_config, save_config, validate_config, GatewayConfig};
use discovery::{Discovery, HttpRegistryBackend, RegistryMasterConfig};
use gateway::{GatewayServer, ProxyState, ShutdownController};
use observability::{init_logging, LogFormat};
use rest_client::RestClient;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config, port } => start_gateway(config, port).await,
        Commands::Validate { config } => validate_command(config),
        Commands::Init { output } => init_command(output),
    }
}

async fn start_gateway<P: AsRef<Path>>(config_path: P, port_override: Option<u16>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;

    let format = LogFormat::parse(&config.logging.format).unwrap_or_default();
    init_logging("calgate", format)?;

    report_validation(&config)?;

    if let Some(metrics_port) = config.gateway.metrics_port {
        observability::init_metrics(metrics_port)?;
    }

    let port = port_override.unwrap_or(config.gateway.port);
    info!(
        host = %config.gateway.host,
        port,
        downstream = %config.gateway.downstream_service,
        "Starting Calgate gateway"
    );

    // Registry backend and the one-time import. The gateway serves
    // immediately; calls arriving before the import completes get the
    // not-ready payload.
    let backend = HttpRegistryBackend::new(RegistryMasterConfig {
        master_url: config.discovery.master_url.clone(),
        token: config.discovery.token.clone(),
        namespace: config.discovery.namespace.clone(),
    })
    .context("failed to build registry backend")?;

    let discovery = Discovery::new(Arc::new(backend));
    discovery.start_import();

    let state = Arc::new(ProxyState::new(
        RestClient::new(discovery),
        config.gateway.downstream_service.clone(),
    ));

    let server = GatewayServer::new(config.gateway.host.clone(), port, gateway::router(state));
    let shutdown = ShutdownController::with_ctrl_c();
    server.run(shutdown.child_token()).await?;

    Ok(())
}

fn report_validation(config: &GatewayConfig) -> Result<()> {
    let report = validate_config(config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start gateway due to configuration errors");
    }

    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = load_config(&config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Gateway: {}:{}", config.gateway.host, config.gateway.port);
    println!("Downstream service: {}", config.gateway.downstream_service);
    println!("Registry master: {}", config.discovery.master_url);
    println!("Namespace: {}", config.discovery.namespace);

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Point discovery.master_url at your registry master");
    println!("  2. Run 'calgate validate --config {:?}' to check the configuration", output_path);
    println!("  3. Run 'calgate start --config {:?}' to start the gateway", output_path);

    Ok(())
}
