//! Tests for the secret store abstraction.

use super::*;
use crate::ErrorKind;
use std::collections::HashMap;

#[test]
fn test_secret_value_debug_is_redacted() {
    let secret = SecretValue::from_string("sensitive-data".to_string());

    let debug_output = format!("{:?}", secret);
    assert!(!debug_output.contains("sensitive-data"));
    assert!(debug_output.contains("[REDACTED]"));
    assert_eq!(secret.len(), 14);
}

#[test]
fn test_memory_store_lookup() {
    let mut store = MemorySecretStore::new();
    store.insert(WEBHOOK_SECRET, "t0ken");

    assert_eq!(
        store.get(WEBHOOK_SECRET).map(|s| s.expose().to_string()),
        Some("t0ken".to_string())
    );
    assert!(store.get(MAILJET_API_KEY).is_none());
}

#[test]
fn test_memory_store_from_map() {
    let mut values = HashMap::new();
    values.insert(MAILJET_API_KEY.to_string(), "key".to_string());
    let store = MemorySecretStore::from_map(values);

    assert_eq!(
        store.get(MAILJET_API_KEY).map(|s| s.expose().to_string()),
        Some("key".to_string())
    );
}

#[test]
fn test_layered_store_first_non_empty_wins() {
    let mut envelope = MemorySecretStore::new();
    envelope.insert(WEBHOOK_SECRET, "from-envelope");

    let mut config = MemorySecretStore::new();
    config.insert(WEBHOOK_SECRET, "from-config");
    config.insert(MAILJET_API_KEY, "key-from-config");

    let layered = LayeredSecretStore::new()
        .push(Arc::new(envelope))
        .push(Arc::new(config));

    assert_eq!(
        layered.get(WEBHOOK_SECRET).map(|s| s.expose().to_string()),
        Some("from-envelope".to_string())
    );
    assert_eq!(
        layered.get(MAILJET_API_KEY).map(|s| s.expose().to_string()),
        Some("key-from-config".to_string())
    );
}

#[test]
fn test_layered_store_skips_empty_values() {
    let mut envelope = MemorySecretStore::new();
    envelope.insert(WEBHOOK_SECRET, "");

    let mut config = MemorySecretStore::new();
    config.insert(WEBHOOK_SECRET, "fallback");

    let layered = LayeredSecretStore::new()
        .push(Arc::new(envelope))
        .push(Arc::new(config));

    assert_eq!(
        layered.get(WEBHOOK_SECRET).map(|s| s.expose().to_string()),
        Some("fallback".to_string())
    );
}

#[test]
fn test_require_rejects_missing_and_empty() {
    let mut store = MemorySecretStore::new();
    store.insert(MAILJET_API_KEY, "");

    let missing = require(&store, MAILJET_API_SECRET).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::MissingConfiguration);
    assert!(missing.public_message().contains(MAILJET_API_SECRET));

    let empty = require(&store, MAILJET_API_KEY).unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::MissingConfiguration);

    store.insert(MAILJET_API_KEY, "present");
    assert!(require(&store, MAILJET_API_KEY).is_ok());
}
