//! # Audit Module
//!
//! Audit event records relayed to the host platform's event-logging
//! endpoint. Emission is always best-effort: a failed audit call is logged
//! at WARN and never fails the request that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::normalize::InboundEmail;

/// A single auditable action with its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier for this audit entry
    pub event_id: Uuid,

    /// Action that was performed
    pub action: String,

    /// When the action occurred
    pub occurred_at: DateTime<Utc>,

    /// Additional structured context
    pub attributes: Map<String, Value>,
}

impl AuditEvent {
    /// Create a new audit event for the given action
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            action: action.into(),
            occurred_at: Utc::now(),
            attributes: Map::new(),
        }
    }

    /// Attach a context attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Event recording an inbound email relayed to the host
    ///
    /// Carries message id, sender, and recipient on a best-effort basis;
    /// absent fields are simply omitted.
    pub fn inbound_email_received(email: &InboundEmail) -> Self {
        let mut event = Self::new("inbound_email_received");

        if let Some(message_id) = &email.message_id {
            event = event.with_attribute("message_id", Value::String(message_id.clone()));
        }
        if let Some(from) = &email.from_email {
            event = event.with_attribute("from", Value::String(from.clone()));
        }
        if let Some(to) = &email.to_email {
            event = event.with_attribute("to", Value::String(to.clone()));
        }

        event
    }

    /// Event recording a provisioned (or reused) provider parse route
    pub fn parse_route_provisioned(route_id: &str, email: Option<&str>, reused: bool) -> Self {
        let mut event = Self::new("parse_route_provisioned")
            .with_attribute("route_id", Value::String(route_id.to_string()))
            .with_attribute("reused", Value::Bool(reused));

        if let Some(email) = email {
            event = event.with_attribute("email", Value::String(email.to_string()));
        }

        event
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
