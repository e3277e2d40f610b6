//! # Mail-Intake Service
//!
//! Binary entry point for the mail-intake HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging
//! - Builds the action handler registry
//! - Starts the HTTP server from mail-intake-api

use mail_intake_api::{actions::default_registry, start_server, ServiceConfig, ServiceError};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mail_intake_service=info,mail_intake_api=info,mail_intake_core=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mail-Intake Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order, later sources override earlier ones):
    //  1. /etc/mail-intake/service.yaml    — system-wide defaults
    //  2. ./config/service.yaml            — deployment-local override
    //  3. Path given by MI_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed MI__ (double-underscore separator)
    //     e.g. MI__SERVER__PORT=9090 sets server.port = 9090
    //
    // All service configuration fields carry serde defaults, so absent files
    // or an entirely unconfigured environment produces a valid service config
    // with built-in defaults. A malformed file or an environment variable
    // that cannot be coerced to the correct type IS a hard error because it
    // indicates deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/mail-intake/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("MI_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("MI").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Build the action handler registry
    //
    // Both actions share the service configuration; secrets supplied in the
    // invocation envelope layer over any literals configured here.
    // -------------------------------------------------------------------------
    let shared_config = Arc::new(service_config.clone());
    let registry = match default_registry(shared_config) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to build handler registry; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        events = ?registry.event_names(),
        "Starting HTTP server"
    );

    // Start the server
    if let Err(e) = start_server(service_config, registry).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
