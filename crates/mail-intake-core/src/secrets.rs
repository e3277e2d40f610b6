//! # Secrets Module
//!
//! Secret lookup abstraction for handler code.
//!
//! Handlers never read the process environment directly; secrets reach them
//! through an injected [`SecretStore`]. The dispatcher forwards
//! operator-configured secrets inside the envelope, and the service layers
//! those over any literals carried in its own configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::IntakeError;

// ============================================================================
// Well-known secret names
// ============================================================================

/// Provider API key, required for route provisioning
pub const MAILJET_API_KEY: &str = "MAILJET_API_KEY";

/// Provider API secret, required for route provisioning
pub const MAILJET_API_SECRET: &str = "MAILJET_API_SECRET";

/// Optional webhook verification token; verification is skipped when absent
pub const WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";

// ============================================================================
// SecretValue
// ============================================================================

/// Secure container for a secret value
///
/// Never appears in Debug output or logs, and the backing memory is
/// zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue(String);

impl SecretValue {
    /// Take ownership of a secret string
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// Get the secret for immediate use
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the secret length without exposing content
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// SecretStore
// ============================================================================

/// Interface for looking up operator-configured secrets by name
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore: Send + Sync {
    /// Look up a secret; `None` when not configured
    fn get(&self, name: &str) -> Option<SecretValue>;
}

/// Require a non-empty secret, naming the missing configuration otherwise
pub fn require(store: &dyn SecretStore, name: &str) -> Result<SecretValue, IntakeError> {
    match store.get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(IntakeError::MissingConfiguration {
            name: name.to_string(),
        }),
    }
}

/// In-memory secret store backed by a string map
///
/// Used for envelope-supplied secrets and for service-config literals.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    values: HashMap<String, String>,
}

impl MemorySecretStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing map
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Insert or replace a secret
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, name: &str) -> Option<SecretValue> {
        self.values
            .get(name)
            .map(|value| SecretValue::from_string(value.clone()))
    }
}

/// Secret store that consults a sequence of stores in order
///
/// The first layer returning a non-empty value wins. Envelope-supplied
/// secrets layer over service-config literals this way.
#[derive(Clone, Default)]
pub struct LayeredSecretStore {
    layers: Vec<Arc<dyn SecretStore>>,
}

impl LayeredSecretStore {
    /// Create an empty layered store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer; earlier layers take precedence
    pub fn push(mut self, layer: Arc<dyn SecretStore>) -> Self {
        self.layers.push(layer);
        self
    }
}

impl SecretStore for LayeredSecretStore {
    fn get(&self, name: &str) -> Option<SecretValue> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(name).filter(|value| !value.is_empty()))
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
