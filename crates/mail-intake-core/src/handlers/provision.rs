//! # Route Provisioning Handler
//!
//! Automates creation of the provider-side parse route. Given the
//! operator's provider credentials, asks the host which callback URL to
//! register, reuses an existing route when one already targets it, and
//! creates one otherwise.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::audit::AuditEvent;
use crate::host::HostApi;
use crate::provider::{NewParseRoute, ParseRoute, RouteApiFactory};
use crate::secrets::{self, SecretStore, MAILJET_API_KEY, MAILJET_API_SECRET};
use crate::{IntakeError, IntakeResult};

/// Event name the dispatcher routes to this handler
pub const ACTION_NAME: &str = "provision-parse-route";

// ============================================================================
// Request / Response Types
// ============================================================================

/// Organization context used to derive a default inbound address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationContext {
    #[serde(default)]
    pub subdomain: Option<String>,
}

/// Project context used as a fallback for the inbound address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default)]
    pub key: Option<String>,
}

/// Provisioning request supplied by the operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub organization: Option<OrganizationContext>,

    #[serde(default)]
    pub project: Option<ProjectContext>,
}

/// Structured response returned to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionOutcome {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Inbound email address associated with the route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProvisionOutcome {
    fn configured(message: impl Into<String>, route: &ParseRoute) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            email: route.email.clone(),
            route_id: Some(route.id.to_string()),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            email: None,
            route_id: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Provision the provider-side parse route
///
/// Idempotent with respect to the callback URL: when an existing route
/// already targets it, that route is reused and no duplicate is created.
#[instrument(skip_all, fields(inbound_domain = %inbound_domain))]
pub async fn provision_parse_route(
    request: &ProvisionRequest,
    secrets: &dyn SecretStore,
    host: &dyn HostApi,
    routes: &dyn RouteApiFactory,
    inbound_domain: &str,
) -> ProvisionOutcome {
    match process(request, secrets, host, routes, inbound_domain).await {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(kind = ?error.kind(), error = %error, "Parse route provisioning failed");
            ProvisionOutcome::failure(error.public_message())
        }
    }
}

async fn process(
    request: &ProvisionRequest,
    secrets: &dyn SecretStore,
    host: &dyn HostApi,
    routes: &dyn RouteApiFactory,
    inbound_domain: &str,
) -> IntakeResult<ProvisionOutcome> {
    // Both credentials must be present before any external call is made.
    let api_key = secrets::require(secrets, MAILJET_API_KEY)?;
    let api_secret = secrets::require(secrets, MAILJET_API_SECRET)?;

    let routes = routes.with_credentials(&api_key, &api_secret);

    let info = host
        .get_webhook_url(crate::handlers::webhook::ACTION_NAME)
        .await?;

    let candidate = derive_inbound_address(request, inbound_domain);

    // A listing failure is treated as "no existing routes"; provisioning
    // should still attempt creation.
    let existing = match routes.list_routes().await {
        Ok(existing) => existing,
        Err(error) => {
            warn!(error = %error, "Could not list existing parse routes; assuming none");
            Vec::new()
        }
    };

    if let Some(route) = find_matching_route(&existing, &info.webhook_url) {
        info!(route_id = route.id, "Parse route already targets the callback URL");
        emit_audit(host, &route, true).await;
        return Ok(ProvisionOutcome::configured(
            "Parse route already configured",
            &route,
        ));
    }

    let created = routes
        .create_route(NewParseRoute {
            url: info.webhook_url.clone(),
            email: candidate.clone(),
        })
        .await?;

    info!(route_id = created.id, "Parse route created");

    // Push the resulting address back into host-side configuration on a
    // best-effort basis.
    if let Some(email) = created.email.clone().or(candidate) {
        let configuration = serde_json::json!({ "inbound_email_address": email });
        if let Err(error) = host.patch_configuration(configuration).await {
            warn!(error = %error, "Failed to push inbound address into host configuration");
        }
    }

    emit_audit(host, &created, false).await;

    Ok(ProvisionOutcome::configured("Parse route created", &created))
}

async fn emit_audit(host: &dyn HostApi, route: &ParseRoute, reused: bool) {
    let event = AuditEvent::parse_route_provisioned(
        &route.id.to_string(),
        route.email.as_deref(),
        reused,
    );
    if let Err(error) = host.log_event(event).await {
        warn!(error = %error, "Failed to emit provisioning audit event");
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Derive the candidate inbound address from request context
///
/// Organization subdomain wins; the project key (lower-cased) is the
/// fallback. Neither available means the provider auto-assigns an address.
fn derive_inbound_address(request: &ProvisionRequest, inbound_domain: &str) -> Option<String> {
    let slug = request
        .organization
        .as_ref()
        .and_then(|org| org.subdomain.as_deref())
        .map(|subdomain| subdomain.trim().to_string())
        .filter(|subdomain| !subdomain.is_empty())
        .or_else(|| {
            request
                .project
                .as_ref()
                .and_then(|project| project.key.as_deref())
                .map(|key| key.trim().to_lowercase())
                .filter(|key| !key.is_empty())
        })?;

    Some(format!("{}@{}", slug, inbound_domain))
}

/// Find an existing route that already targets the callback URL
///
/// Exact URL equality, or — as a heuristic carried over from the original
/// behavior — a stored URL containing the callback's final path token as a
/// substring. The substring check can false-positive when two callback URLs
/// share a token; it is an approximation, not a uniqueness guarantee.
fn find_matching_route(existing: &[ParseRoute], webhook_url: &str) -> Option<ParseRoute> {
    let token = path_token(webhook_url);

    existing
        .iter()
        .find(|route| {
            route.url == webhook_url
                || token.is_some_and(|token| route.url.contains(token))
        })
        .cloned()
}

/// Final non-empty path segment of a URL, ignoring query and fragment
fn path_token(webhook_url: &str) -> Option<&str> {
    let without_query = webhook_url
        .split_once(['?', '#'])
        .map_or(webhook_url, |(path, _)| path);

    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    let (_, path) = after_scheme.split_once('/')?;
    path.rsplit('/').find(|segment| !segment.is_empty())
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
