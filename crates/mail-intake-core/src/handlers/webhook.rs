//! # Webhook Handler
//!
//! Receives a forwarded provider webhook wrapped in the dispatcher
//! envelope, optionally verifies the operator's shared token, normalizes
//! the payload, and relays it to the host platform's inbound email
//! ingestion endpoint.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::audit::AuditEvent;
use crate::body::parse_body;
use crate::envelope::WebhookEnvelope;
use crate::host::HostApi;
use crate::normalize::normalize;
use crate::secrets::{SecretStore, WEBHOOK_SECRET};
use crate::token::verify_token;
use crate::{IntakeError, IntakeResult};

/// Event name the dispatcher routes to this handler
pub const ACTION_NAME: &str = "inbound-email-webhook";

/// Structured response returned to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookOutcome {
    pub ok: bool,

    /// Host-assigned id of the ingested record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookOutcome {
    /// Successful relay with the host-assigned id
    pub fn success(id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            error: None,
        }
    }

    /// Failed relay with a caller-safe message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Handle a forwarded inbound email webhook
///
/// Every failure mode becomes a structured [`WebhookOutcome`]; the
/// dispatcher always receives a response.
#[instrument(skip_all)]
pub async fn handle_inbound_webhook(
    envelope: &WebhookEnvelope,
    secrets: &dyn SecretStore,
    host: &dyn HostApi,
) -> WebhookOutcome {
    match process(envelope, secrets, host).await {
        Ok(id) => {
            info!(id = %id, "Inbound email relayed to host");
            WebhookOutcome::success(id)
        }
        Err(error) => {
            warn!(kind = ?error.kind(), error = %error, "Inbound webhook rejected");
            WebhookOutcome::failure(error.public_message())
        }
    }
}

async fn process(
    envelope: &WebhookEnvelope,
    secrets: &dyn SecretStore,
    host: &dyn HostApi,
) -> IntakeResult<String> {
    // Verification is opt-in: with no configured secret the endpoint is
    // open, matching the dispatcher's default deployment.
    if let Some(secret) = secrets.get(WEBHOOK_SECRET).filter(|s| !s.is_empty()) {
        if !verify_token(envelope.verification_token(), secret.expose()) {
            return Err(IntakeError::Unauthorized);
        }
    }

    let raw = parse_body(envelope.body.as_deref(), envelope.effective_content_type()).map_err(
        |error| IntakeError::InvalidInput {
            message: error.category_message(),
        },
    )?;

    let email = normalize(&raw);

    let id = host.create_inbound_email(&email).await?;

    // Best-effort audit; a failed emission never fails the request.
    let event = AuditEvent::inbound_email_received(&email);
    if let Err(error) = host.log_event(event).await {
        warn!(error = %error, "Failed to emit inbound email audit event");
    }

    Ok(id)
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
