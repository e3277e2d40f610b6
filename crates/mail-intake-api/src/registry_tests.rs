//! Tests for event names and the handler registry.

use super::*;
use serde_json::json;

struct EchoHandler(&'static str);

#[async_trait]
impl ActionHandler for EchoHandler {
    async fn handle(&self, _payload: serde_json::Value) -> serde_json::Value {
        json!({ "handler": self.0 })
    }
}

// ============================================================================
// EventName
// ============================================================================

#[test]
fn test_valid_event_names() {
    for name in ["inbound-email-webhook", "provision-parse-route", "a", "x_1"] {
        assert!(EventName::new(name).is_ok(), "{name} should be valid");
    }
}

#[test]
fn test_empty_event_name_rejected() {
    assert!(matches!(
        EventName::new(""),
        Err(InvalidEventNameError::Empty)
    ));
}

#[test]
fn test_invalid_characters_rejected() {
    for name in ["Inbound", "has space", "slash/name", "dotted.name"] {
        assert!(
            matches!(
                EventName::new(name),
                Err(InvalidEventNameError::InvalidChars { .. })
            ),
            "{name} should be rejected"
        );
    }
}

#[test]
fn test_event_name_display() {
    let name = EventName::new("inbound-email-webhook").unwrap();
    assert_eq!(name.to_string(), "inbound-email-webhook");
    assert_eq!(name.as_str(), "inbound-email-webhook");
}

// ============================================================================
// HandlerRegistry
// ============================================================================

#[tokio::test]
async fn test_register_and_dispatch() {
    let mut registry = HandlerRegistry::new();
    registry.register(
        EventName::new("first").unwrap(),
        Arc::new(EchoHandler("first")),
    );

    let handler = registry.get("first").expect("handler registered");
    let outcome = handler.handle(json!({})).await;
    assert_eq!(outcome, json!({ "handler": "first" }));

    assert!(registry.contains("first"));
    assert!(!registry.contains("second"));
    assert!(registry.get("second").is_none());
}

#[test]
fn test_registration_replaces_previous() {
    let mut registry = HandlerRegistry::new();
    registry.register(
        EventName::new("event").unwrap(),
        Arc::new(EchoHandler("old")),
    );
    registry.register(
        EventName::new("event").unwrap(),
        Arc::new(EchoHandler("new")),
    );

    assert_eq!(registry.len(), 1);
}

#[test]
fn test_event_names_are_sorted() {
    let mut registry = HandlerRegistry::new();
    registry.register(EventName::new("zeta").unwrap(), Arc::new(EchoHandler("z")));
    registry.register(EventName::new("alpha").unwrap(), Arc::new(EchoHandler("a")));

    assert_eq!(registry.event_names(), vec!["alpha", "zeta"]);
}

#[test]
fn test_empty_registry() {
    let registry = HandlerRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.event_names().is_empty());
}

#[test]
fn test_debug_lists_events_not_handlers() {
    let mut registry = HandlerRegistry::new();
    registry.register(EventName::new("only").unwrap(), Arc::new(EchoHandler("o")));

    let debug = format!("{:?}", registry);
    assert!(debug.contains("only"));
}
