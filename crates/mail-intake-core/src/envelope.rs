//! # Webhook Envelope Module
//!
//! The dispatcher forwards the provider's original HTTP request wrapped in
//! an envelope: the raw body and headers travel as opaque data, and the
//! dispatcher adds an authentication block with a short-lived runtime token
//! plus any operator-configured secrets.
//!
//! The body stays opaque until [`crate::body::parse_body`] interprets it
//! according to the declared content type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header carrying the operator's webhook verification token
pub const TOKEN_HEADER: &str = "x-webhook-token";

/// Query parameter alternative to [`TOKEN_HEADER`]
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Authentication block added by the dispatcher
///
/// The runtime token is scoped to a single invocation and authenticates
/// this adapter's outbound calls to the host API without a long-lived key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(default)]
    pub runtime_token: String,
}

/// Inbound webhook envelope received from the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Raw request body, originally a string; opaque until parsed
    #[serde(default)]
    pub body: Option<String>,

    /// Original request headers (name to value)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Original request query parameters
    #[serde(default)]
    pub query: HashMap<String, String>,

    /// Declared content type of the body
    #[serde(default)]
    pub content_type: Option<String>,

    /// Dispatcher-added authentication block
    #[serde(default)]
    pub auth: AuthContext,

    /// Operator-configured secrets, supplied out-of-band
    #[serde(default)]
    pub secrets: Option<HashMap<String, String>>,
}

impl WebhookEnvelope {
    /// Look up a header by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Content type declared for the body
    ///
    /// Prefers the envelope's explicit `content_type` field and falls back
    /// to the forwarded `Content-Type` header.
    pub fn effective_content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .or_else(|| self.header("content-type"))
    }

    /// Verification token carried by the request, if any
    ///
    /// Checked in the [`TOKEN_HEADER`] header first, then the
    /// [`TOKEN_QUERY_PARAM`] query parameter.
    pub fn verification_token(&self) -> Option<&str> {
        self.header(TOKEN_HEADER)
            .or_else(|| self.query.get(TOKEN_QUERY_PARAM).map(String::as_str))
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
