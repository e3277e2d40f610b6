//! # Host API Module
//!
//! Client for the host platform's API. Every call is authenticated with
//! the short-lived runtime token the dispatcher issued for the current
//! invocation, so a fresh [`HostClient`] is constructed per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::audit::AuditEvent;
use crate::normalize::InboundEmail;
use crate::{IntakeError, IntakeResult};

// ============================================================================
// Core Types
// ============================================================================

/// Callback registration details returned by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookUrlInfo {
    /// URL the provider should deliver webhooks to
    pub webhook_url: String,

    /// Verification token the host expects on deliveries to that URL
    #[serde(default)]
    pub webhook_token: Option<String>,
}

/// Host response carrying the id of an ingested record
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

// ============================================================================
// HostApi Trait
// ============================================================================

/// Interface to the host platform's API
///
/// Abstracted so handler logic is testable without live network calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Ask the host which callback URL this adapter should register
    async fn get_webhook_url(&self, action_name: &str) -> IntakeResult<WebhookUrlInfo>;

    /// Submit a canonical inbound email record; returns the host-assigned id
    async fn create_inbound_email(&self, email: &InboundEmail) -> IntakeResult<String>;

    /// Merge values into host-side configuration
    async fn patch_configuration(&self, configuration: serde_json::Value) -> IntakeResult<()>;

    /// Record an audit event; callers treat failures as non-fatal
    async fn log_event(&self, event: AuditEvent) -> IntakeResult<()>;
}

// ============================================================================
// HostClient
// ============================================================================

/// Reqwest-backed [`HostApi`] implementation
///
/// Bound to one runtime token and therefore to one invocation.
#[derive(Debug, Clone)]
pub struct HostClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HostClient {
    /// Create a client against the given base URL with a runtime token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check(response: reqwest::Response, what: &str) -> IntakeResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(IntakeError::UpstreamApi {
            message: format!("Host API {} failed with {}: {}", what, status, detail),
        })
    }
}

#[async_trait]
impl HostApi for HostClient {
    #[instrument(skip(self))]
    async fn get_webhook_url(&self, action_name: &str) -> IntakeResult<WebhookUrlInfo> {
        let response = self
            .http
            .get(self.url("webhook_url"))
            .query(&[("action_name", action_name)])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API webhook_url request failed: {}", e),
            })?;

        Self::check(response, "webhook_url")
            .await?
            .json::<WebhookUrlInfo>()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API webhook_url response invalid: {}", e),
            })
    }

    #[instrument(skip(self, email), fields(message_id = ?email.message_id))]
    async fn create_inbound_email(&self, email: &InboundEmail) -> IntakeResult<String> {
        let response = self
            .http
            .post(self.url("inbound_emails"))
            .bearer_auth(&self.token)
            .json(&json!({ "inbound_email": email }))
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API inbound_emails request failed: {}", e),
            })?;

        let created: CreatedResponse = Self::check(response, "inbound_emails")
            .await?
            .json()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API inbound_emails response invalid: {}", e),
            })?;

        Ok(created.id)
    }

    #[instrument(skip(self, configuration))]
    async fn patch_configuration(&self, configuration: serde_json::Value) -> IntakeResult<()> {
        let response = self
            .http
            .patch(self.url("configuration"))
            .bearer_auth(&self.token)
            .json(&json!({ "configuration": configuration }))
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API configuration request failed: {}", e),
            })?;

        Self::check(response, "configuration").await?;
        Ok(())
    }

    #[instrument(skip(self, event), fields(action = %event.action))]
    async fn log_event(&self, event: AuditEvent) -> IntakeResult<()> {
        let response = self
            .http
            .post(self.url("events"))
            .bearer_auth(&self.token)
            .json(&event)
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Host API events request failed: {}", e),
            })?;

        Self::check(response, "events").await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
