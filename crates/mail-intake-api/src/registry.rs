//! Handler registry for event-name dispatch.
//!
//! The dispatcher invokes this service with an event name; the registry
//! associates each supported name with its [`ActionHandler`]. It is built
//! once at startup and used read-only during request handling.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

// ============================================================================
// EventName
// ============================================================================

/// Identifier for a dispatchable action.
///
/// An event name must consist entirely of lowercase ASCII letters, digits,
/// hyphens (`-`), or underscores (`_`). It must not be empty.
///
/// # Examples
///
/// ```rust
/// use mail_intake_api::registry::EventName;
///
/// let name = EventName::new("inbound-email-webhook").unwrap();
/// assert_eq!(name.as_str(), "inbound-email-webhook");
///
/// assert!(EventName::new("Inbound").is_err()); // uppercase not allowed
/// assert!(EventName::new("").is_err());        // empty not allowed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName(String);

impl EventName {
    /// Create a new `EventName`, validating its character set.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEventNameError::Empty`] if the value is empty.
    /// Returns [`InvalidEventNameError::InvalidChars`] if the value contains
    /// characters outside `[a-z0-9\-_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidEventNameError> {
        let s = value.into();
        if s.is_empty() {
            return Err(InvalidEventNameError::Empty);
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(InvalidEventNameError::InvalidChars { value: s });
        }
        Ok(Self(s))
    }

    /// Return the event name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when an [`EventName`] cannot be created.
#[derive(Debug, thiserror::Error)]
pub enum InvalidEventNameError {
    /// Event name must not be empty.
    #[error("Event name must not be empty")]
    Empty,

    /// Event name contains characters outside `[a-z0-9\\-_]`.
    #[error(
        "Event name '{value}' contains invalid characters; \
         use lowercase alphanumeric, hyphens, or underscores"
    )]
    InvalidChars { value: String },
}

// ============================================================================
// ActionHandler
// ============================================================================

/// A dispatchable action.
///
/// Handlers receive the invocation payload as raw JSON and must always
/// produce a structured JSON response; the dispatch layer never surfaces a
/// handler failure as anything but a response body.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, payload: serde_json::Value) -> serde_json::Value;
}

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Registry mapping event names to their action handlers.
///
/// Built once at service startup and used read-only during request
/// handling. All values are stored as `Arc<dyn ActionHandler>` to allow
/// sharing across async tasks.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventName, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the given event name, replacing any
    /// previous registration.
    pub fn register(&mut self, name: EventName, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(name, handler);
    }

    /// Look up the handler for an event name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, handler)| Arc::clone(handler))
    }

    /// Check whether an event name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sorted list of registered event names, for the health endpoint.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .keys()
            .map(|name| name.as_str().to_string())
            .collect();
        names.sort();
        names
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("events", &self.event_names())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
