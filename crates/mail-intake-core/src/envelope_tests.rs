//! Tests for the dispatcher envelope.

use super::*;
use serde_json::json;

fn envelope_from(value: serde_json::Value) -> WebhookEnvelope {
    serde_json::from_value(value).expect("envelope should deserialize")
}

#[test]
fn test_minimal_envelope_deserializes() {
    let envelope = envelope_from(json!({}));

    assert!(envelope.body.is_none());
    assert!(envelope.headers.is_empty());
    assert!(envelope.query.is_empty());
    assert!(envelope.secrets.is_none());
    assert_eq!(envelope.auth.runtime_token, "");
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let envelope = envelope_from(json!({
        "headers": { "X-Webhook-Token": "t0ken", "Content-Type": "application/json" }
    }));

    assert_eq!(envelope.header("x-webhook-token"), Some("t0ken"));
    assert_eq!(envelope.header("CONTENT-TYPE"), Some("application/json"));
    assert_eq!(envelope.header("x-missing"), None);
}

#[test]
fn test_effective_content_type_prefers_explicit_field() {
    let envelope = envelope_from(json!({
        "content_type": "application/json",
        "headers": { "content-type": "text/plain" }
    }));

    assert_eq!(envelope.effective_content_type(), Some("application/json"));
}

#[test]
fn test_effective_content_type_falls_back_to_header() {
    let envelope = envelope_from(json!({
        "headers": { "Content-Type": "application/x-www-form-urlencoded" }
    }));

    assert_eq!(
        envelope.effective_content_type(),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn test_verification_token_prefers_header_over_query() {
    let envelope = envelope_from(json!({
        "headers": { "x-webhook-token": "from-header" },
        "query": { "token": "from-query" }
    }));

    assert_eq!(envelope.verification_token(), Some("from-header"));
}

#[test]
fn test_verification_token_from_query_parameter() {
    let envelope = envelope_from(json!({
        "query": { "token": "from-query" }
    }));

    assert_eq!(envelope.verification_token(), Some("from-query"));
}

#[test]
fn test_verification_token_absent() {
    let envelope = envelope_from(json!({}));
    assert_eq!(envelope.verification_token(), None);
}

#[test]
fn test_runtime_token_and_secrets_deserialize() {
    let envelope = envelope_from(json!({
        "auth": { "runtime_token": "rt-abc" },
        "secrets": { "WEBHOOK_SECRET": "s3cret" }
    }));

    assert_eq!(envelope.auth.runtime_token, "rt-abc");
    let secrets = envelope.secrets.expect("secrets should be present");
    assert_eq!(secrets.get("WEBHOOK_SECRET").map(String::as_str), Some("s3cret"));
}
