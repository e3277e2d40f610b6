//! # Provider API Module
//!
//! Client for the email-parsing provider's route-management REST API
//! (Mailjet's Parse API). Authenticated with the two long-lived operator
//! credentials retrieved from the secret store.
//!
//! Only the calls provisioning needs are covered: list routes and create a
//! route.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::secrets::SecretValue;
use crate::{IntakeError, IntakeResult};

/// Default Parse API base URL
pub const DEFAULT_MAILJET_BASE_URL: &str = "https://api.mailjet.com/v3/REST";

// ============================================================================
// Core Types
// ============================================================================

/// A provider-side parse route
///
/// Maps an inbound email address to a destination callback URL. Routes are
/// provider-owned; this adapter only lists and creates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRoute {
    #[serde(rename = "ID")]
    pub id: u64,

    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}

/// Request body for creating a parse route
///
/// When `email` is absent the provider auto-assigns an inbound address.
#[derive(Debug, Clone, Serialize)]
pub struct NewParseRoute {
    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Provider list/create response envelope
#[derive(Debug, Deserialize)]
struct RouteListEnvelope {
    #[serde(rename = "Count", default)]
    #[allow(dead_code)]
    count: u64,

    #[serde(rename = "Data", default)]
    data: Vec<ParseRoute>,
}

// ============================================================================
// RouteApi Trait
// ============================================================================

/// Interface to the provider's route-management API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteApi: Send + Sync {
    /// List existing parse routes
    async fn list_routes(&self) -> IntakeResult<Vec<ParseRoute>>;

    /// Create a new parse route
    async fn create_route(&self, route: NewParseRoute) -> IntakeResult<ParseRoute>;
}

/// Factory producing a credentialed [`RouteApi`]
///
/// Provisioning retrieves the operator credentials first and only then
/// configures a client, so construction is deferred behind this seam.
#[cfg_attr(test, mockall::automock)]
pub trait RouteApiFactory: Send + Sync {
    /// Build a route client bound to the given credentials
    fn with_credentials(
        &self,
        api_key: &SecretValue,
        api_secret: &SecretValue,
    ) -> Arc<dyn RouteApi>;
}

// ============================================================================
// MailjetClient
// ============================================================================

/// Reqwest-backed [`RouteApi`] implementation for Mailjet's Parse API
pub struct MailjetClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl MailjetClient {
    /// Create a client with the operator's API credentials
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    fn parseroute_url(&self) -> String {
        format!("{}/parseroute", self.base_url)
    }

    /// Map a provider failure onto a user-facing upstream error
    ///
    /// 401 and 403 get fixed messages, "already exists" is recognized in
    /// the response body, everything else passes the provider's message
    /// through verbatim.
    fn map_error(status: reqwest::StatusCode, body: &str) -> IntakeError {
        let message = if status == reqwest::StatusCode::UNAUTHORIZED {
            "Invalid Mailjet API credentials".to_string()
        } else if status == reqwest::StatusCode::FORBIDDEN {
            "Mailjet plan does not include the Parse API".to_string()
        } else if body.contains("already exists") {
            "Parse route already exists".to_string()
        } else {
            provider_message(body)
        };

        IntakeError::UpstreamApi { message }
    }
}

impl std::fmt::Debug for MailjetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailjetClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .finish()
    }
}

/// Pull the error message out of a provider response body
///
/// Mailjet reports errors as `{"ErrorMessage": "..."}`; anything else is
/// passed through as-is.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("ErrorMessage")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl RouteApi for MailjetClient {
    #[instrument(skip(self))]
    async fn list_routes(&self) -> IntakeResult<Vec<ParseRoute>> {
        let response = self
            .http
            .get(self.parseroute_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Mailjet parseroute listing failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error(status, &body));
        }

        let envelope: RouteListEnvelope =
            response.json().await.map_err(|e| IntakeError::UpstreamApi {
                message: format!("Mailjet parseroute response invalid: {}", e),
            })?;

        Ok(envelope.data)
    }

    #[instrument(skip(self), fields(url = %route.url))]
    async fn create_route(&self, route: NewParseRoute) -> IntakeResult<ParseRoute> {
        let response = self
            .http
            .post(self.parseroute_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&route)
            .send()
            .await
            .map_err(|e| IntakeError::UpstreamApi {
                message: format!("Mailjet parseroute creation failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error(status, &body));
        }

        let envelope: RouteListEnvelope =
            response.json().await.map_err(|e| IntakeError::UpstreamApi {
                message: format!("Mailjet parseroute response invalid: {}", e),
            })?;

        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| IntakeError::UpstreamApi {
                message: "Mailjet parseroute creation returned no route".to_string(),
            })
    }
}

// ============================================================================
// MailjetClientFactory
// ============================================================================

/// [`RouteApiFactory`] producing [`MailjetClient`] instances
#[derive(Debug, Clone)]
pub struct MailjetClientFactory {
    base_url: String,
}

impl MailjetClientFactory {
    /// Create a factory against the given Parse API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for MailjetClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_MAILJET_BASE_URL)
    }
}

impl RouteApiFactory for MailjetClientFactory {
    fn with_credentials(
        &self,
        api_key: &SecretValue,
        api_secret: &SecretValue,
    ) -> Arc<dyn RouteApi> {
        Arc::new(MailjetClient::new(
            self.base_url.clone(),
            api_key.expose(),
            api_secret.expose(),
        ))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
