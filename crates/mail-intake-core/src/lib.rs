//! # Mail-Intake Core
//!
//! Core business logic for the mail-intake inbound email webhook adapter.
//!
//! The adapter sits between an email-parsing provider (Mailjet's Parse API)
//! and a host platform. Inbound email notifications arrive wrapped in a
//! dispatcher envelope, get normalized into a canonical record, and are
//! relayed to the host platform's ingestion endpoint using a short-lived
//! per-invocation credential. A second action provisions the provider-side
//! parse route against the host's callback URL.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Handlers depend only on trait abstractions ([`SecretStore`],
//!   [`HostApi`], [`RouteApi`])
//! - Infrastructure implementations ([`HostClient`], [`MailjetClient`]) are
//!   injected at runtime
//! - Normalization and token verification are pure functions with no
//!   external dependencies

use serde::{Deserialize, Serialize};

/// Standard result type for mail-intake operations
pub type IntakeResult<T> = Result<T, IntakeError>;

// ============================================================================
// Error Types
// ============================================================================

/// High-level error classification for response shaping and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Token verification failed; caller sees a generic message
    Unauthorized,
    /// Request body could not be interpreted
    InvalidInput,
    /// A required credential or setting is absent
    MissingConfiguration,
    /// The provider or host API rejected a call
    UpstreamApi,
    /// Any other unexpected fault
    Internal,
}

/// Top-level error type for mail-intake operations
///
/// Every handler converts these into a structured response; no variant is
/// ever allowed to escape as an unhandled fault.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid payload: {message}")]
    InvalidInput { message: String },

    #[error("Missing configuration: {name}")]
    MissingConfiguration { name: String },

    #[error("Upstream API error: {message}")]
    UpstreamApi { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl IntakeError {
    /// Get error classification for response shaping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::MissingConfiguration { .. } => ErrorKind::MissingConfiguration,
            Self::UpstreamApi { .. } => ErrorKind::UpstreamApi,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Message safe to return to the caller
    ///
    /// Token mismatches stay generic so no detail about the configured
    /// secret leaks. Everything else carries its message but never a stack
    /// trace or raw parser internals.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::InvalidInput { message } => message.clone(),
            Self::MissingConfiguration { name } => {
                format!("Missing configuration: {}", name)
            }
            Self::UpstreamApi { message } => message.clone(),
            Self::Internal { message } => message.clone(),
        }
    }
}

// ============================================================================
// Module declarations
// ============================================================================

/// Dispatcher envelope wrapping the forwarded provider request
pub mod envelope;

/// Body parsing keyed by declared content type
pub mod body;

/// Payload normalization into the canonical inbound email record
pub mod normalize;

/// Constant-time shared-secret token verification
pub mod token;

/// Secret lookup abstraction and in-memory implementations
pub mod secrets;

/// Host platform API client
pub mod host;

/// Provider (Mailjet Parse API) client
pub mod provider;

/// Audit event records emitted to the host platform
pub mod audit;

/// The two stateless action handlers
pub mod handlers;

// Re-export key types for convenience
pub use audit::AuditEvent;
pub use body::{parse_body, BodyError};
pub use envelope::{AuthContext, WebhookEnvelope};
pub use handlers::provision::{
    provision_parse_route, OrganizationContext, ProjectContext, ProvisionOutcome,
    ProvisionRequest,
};
pub use handlers::webhook::{handle_inbound_webhook, WebhookOutcome};
pub use host::{HostApi, HostClient, WebhookUrlInfo};
pub use normalize::{normalize, AttachmentMeta, InboundEmail};
pub use provider::{
    MailjetClient, MailjetClientFactory, NewParseRoute, ParseRoute, RouteApi, RouteApiFactory,
    DEFAULT_MAILJET_BASE_URL,
};
pub use secrets::{
    LayeredSecretStore, MemorySecretStore, SecretStore, SecretValue, MAILJET_API_KEY,
    MAILJET_API_SECRET, WEBHOOK_SECRET,
};
pub use token::verify_token;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
