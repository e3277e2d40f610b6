//! # Mail-Intake HTTP Service
//!
//! HTTP server exposing the action dispatch endpoint the dispatcher calls.
//!
//! This service provides:
//! - `POST /handle?event=<name>` dispatching to registered action handlers
//! - Health check endpoint listing the registered events
//!
//! Handlers always answer with HTTP 200 and a structured JSON outcome;
//! only dispatch-level failures (missing or unknown event name) map to
//! HTTP error statuses.

// Public modules
pub mod actions;
pub mod registry;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument};

use crate::registry::HandlerRegistry;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Registered action handlers
    pub registry: Arc<HandlerRegistry>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Arc<ServiceConfig>, registry: Arc<HandlerRegistry>) -> Self {
        Self { config, registry }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Host platform API settings
    pub host_api: HostApiConfig,

    /// Parse route provisioning settings
    pub provisioning: ProvisioningConfig,

    /// Secret literals layered under envelope-supplied secrets
    ///
    /// Envelope secrets win; these are a deployment-local fallback.
    pub secrets: HashMap<String, String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate the configuration before starting the server
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::Invalid {
                message: "server.host must not be empty".to_string(),
            });
        }

        url::Url::parse(&self.host_api.base_url).map_err(|e| ConfigError::Invalid {
            message: format!("host_api.base_url is not a valid URL: {}", e),
        })?;

        url::Url::parse(&self.provisioning.mailjet_base_url).map_err(|e| {
            ConfigError::Invalid {
                message: format!("provisioning.mailjet_base_url is not a valid URL: {}", e),
            }
        })?;

        if self.provisioning.inbound_domain.is_empty() {
            return Err(ConfigError::Invalid {
                message: "provisioning.inbound_domain must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Host platform API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostApiConfig {
    /// Base URL of the host platform API
    pub base_url: String,
}

impl Default for HostApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.example.com/api".to_string(),
        }
    }
}

/// Parse route provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Domain used when deriving a candidate inbound address
    pub inbound_domain: String,

    /// Mailjet Parse API base URL
    pub mailjet_base_url: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            inbound_domain: "inbound.example.com".to_string(),
            mailjet_base_url: mail_intake_core::DEFAULT_MAILJET_BASE_URL.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/handle", post(handle_dispatch))
        .route("/health", get(handle_health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(
    config: ServiceConfig,
    registry: HandlerRegistry,
) -> Result<(), ServiceError> {
    config.validate()?;

    let state = AppState::new(Arc::new(config.clone()), Arc::new(registry));
    let app = create_router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        }
    })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_timeout =
        std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let shutdown_signal = async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to install Ctrl+C signal handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to install SIGTERM signal handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!(
                    "Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout",
                    shutdown_timeout.as_secs()
                );
            },
            _ = terminate => {
                info!(
                    "Received SIGTERM, initiating graceful shutdown with {}s timeout",
                    shutdown_timeout.as_secs()
                );
            },
        }
    };

    // In-flight requests complete before shutdown; new connections stop
    // being accepted as soon as the signal arrives.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Request Handlers
// ============================================================================

/// Dispatch one invocation to the handler registered for the event name
///
/// The event name travels in the `event` query parameter; the payload is
/// the request body. Registered handlers always answer with HTTP 200 and a
/// structured outcome, so only dispatch-level failures reach
/// [`DispatchError`].
#[instrument(skip(state, payload))]
pub async fn handle_dispatch(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let event = params
        .get("event")
        .map(String::as_str)
        .filter(|event| !event.is_empty())
        .ok_or(DispatchError::MissingEvent)?;

    let handler = state
        .registry
        .get(event)
        .ok_or_else(|| DispatchError::UnknownEvent {
            event: event.to_string(),
        })?;

    info!(event = %event, "Dispatching invocation");

    let outcome = handler.handle(payload).await;
    Ok(Json(outcome))
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// Event names this instance can dispatch
    pub registered_events: Vec<String>,
}

/// Handle health check requests
pub async fn handle_health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        registered_events: state.registry.event_names(),
    })
}

// ============================================================================
// Errors
// ============================================================================

/// Dispatch-level errors
///
/// These cover request routing only; handler failures are reported inside
/// the handler's own structured outcome with HTTP 200.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The `event` query parameter is missing or empty
    ///
    /// Maps to: `400 Bad Request`
    #[error("Missing 'event' query parameter")]
    MissingEvent,

    /// No handler is registered under the given event name
    ///
    /// Maps to: `404 Not Found`
    #[error("Unknown event '{event}'")]
    UnknownEvent { event: String },
}

impl axum::response::IntoResponse for DispatchError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::MissingEvent => StatusCode::BAD_REQUEST,
            Self::UnknownEvent { .. } => StatusCode::NOT_FOUND,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
