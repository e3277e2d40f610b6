//! Action handlers bridging the dispatch endpoint to the core handlers.
//!
//! Each action deserializes its invocation payload, assembles the
//! per-invocation collaborators (secret store layered from envelope and
//! service configuration, host client bound to the runtime token), runs
//! the core handler, and serializes its structured outcome.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};
use tracing::warn;

use mail_intake_core::{
    handle_inbound_webhook, provision_parse_route, AuthContext, HostClient, LayeredSecretStore,
    MailjetClientFactory, MemorySecretStore, OrganizationContext, ProjectContext,
    ProvisionRequest, SecretStore, WebhookEnvelope,
};

use crate::registry::{ActionHandler, EventName, HandlerRegistry, InvalidEventNameError};
use crate::ServiceConfig;

// ============================================================================
// Shared plumbing
// ============================================================================

/// Layer envelope-supplied secrets over service-config literals
fn secret_store(
    envelope_secrets: Option<&HashMap<String, String>>,
    config: &ServiceConfig,
) -> LayeredSecretStore {
    let mut store = LayeredSecretStore::new();
    if let Some(secrets) = envelope_secrets {
        store = store.push(Arc::new(MemorySecretStore::from_map(secrets.clone())));
    }
    store.push(Arc::new(MemorySecretStore::from_map(config.secrets.clone())))
}

/// Host client bound to this invocation's runtime token
fn host_client(auth: &AuthContext, config: &ServiceConfig) -> HostClient {
    HostClient::new(config.host_api.base_url.clone(), auth.runtime_token.clone())
}

/// Serialize an outcome, degrading to a generic failure body if needed
fn outcome_json<T: serde::Serialize>(outcome: &T) -> serde_json::Value {
    serde_json::to_value(outcome).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize handler outcome");
        json!({ "ok": false, "error": "Internal error" })
    })
}

// ============================================================================
// Inbound webhook action
// ============================================================================

/// Action relaying forwarded inbound email webhooks to the host
pub struct InboundWebhookAction {
    config: Arc<ServiceConfig>,
}

impl InboundWebhookAction {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for InboundWebhookAction {
    async fn handle(&self, payload: serde_json::Value) -> serde_json::Value {
        let envelope: WebhookEnvelope = match serde_json::from_value(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Invocation payload is not a webhook envelope");
                return json!({ "ok": false, "error": "Invalid invocation payload" });
            }
        };

        let secrets = secret_store(envelope.secrets.as_ref(), &self.config);
        let host = host_client(&envelope.auth, &self.config);

        let outcome = handle_inbound_webhook(&envelope, &secrets, &host).await;
        outcome_json(&outcome)
    }
}

// ============================================================================
// Provisioning action
// ============================================================================

/// Invocation payload for parse route provisioning
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionInvocation {
    #[serde(default)]
    pub auth: AuthContext,

    #[serde(default)]
    pub secrets: Option<HashMap<String, String>>,

    #[serde(default)]
    pub organization: Option<OrganizationContext>,

    #[serde(default)]
    pub project: Option<ProjectContext>,
}

/// Action provisioning the provider-side parse route
pub struct ProvisionAction {
    config: Arc<ServiceConfig>,
}

impl ProvisionAction {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ActionHandler for ProvisionAction {
    async fn handle(&self, payload: serde_json::Value) -> serde_json::Value {
        let invocation: ProvisionInvocation = match serde_json::from_value(payload) {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!(error = %e, "Invocation payload is not a provisioning request");
                return json!({ "success": false, "error": "Invalid invocation payload" });
            }
        };

        let secrets: Arc<dyn SecretStore> =
            Arc::new(secret_store(invocation.secrets.as_ref(), &self.config));
        let host = host_client(&invocation.auth, &self.config);
        let factory =
            MailjetClientFactory::new(self.config.provisioning.mailjet_base_url.clone());

        let request = ProvisionRequest {
            organization: invocation.organization,
            project: invocation.project,
        };

        let outcome = provision_parse_route(
            &request,
            secrets.as_ref(),
            &host,
            &factory,
            &self.config.provisioning.inbound_domain,
        )
        .await;
        outcome_json(&outcome)
    }
}

// ============================================================================
// Registry construction
// ============================================================================

/// Build the registry with every action this service supports
pub fn default_registry(
    config: Arc<ServiceConfig>,
) -> Result<HandlerRegistry, InvalidEventNameError> {
    let mut registry = HandlerRegistry::new();

    registry.register(
        EventName::new(mail_intake_core::handlers::webhook::ACTION_NAME)?,
        Arc::new(InboundWebhookAction::new(Arc::clone(&config))),
    );

    registry.register(
        EventName::new(mail_intake_core::handlers::provision::ACTION_NAME)?,
        Arc::new(ProvisionAction::new(config)),
    );

    Ok(registry)
}
