//! Tests for payload normalization.

use super::*;
use serde_json::json;

fn payload(value: serde_json::Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test payload must be an object, got {:?}", other),
    }
}

// ============================================================================
// Address parsing
// ============================================================================

#[test]
fn test_extract_email_with_display_name() {
    assert_eq!(
        extract_email("John Doe <john@example.com>"),
        Some("john@example.com".to_string())
    );
}

#[test]
fn test_extract_email_bare_address() {
    assert_eq!(
        extract_email("  john@example.com  "),
        Some("john@example.com".to_string())
    );
}

#[test]
fn test_extract_email_empty_input() {
    assert_eq!(extract_email(""), None);
    assert_eq!(extract_email("   "), None);
}

#[test]
fn test_extract_name_variants() {
    assert_eq!(
        extract_name("John Doe <john@example.com>"),
        Some("John Doe".to_string())
    );
    assert_eq!(
        extract_name("\"John Doe\" <john@example.com>"),
        Some("John Doe".to_string())
    );
    assert_eq!(
        extract_name("'John Doe' <john@example.com>"),
        Some("John Doe".to_string())
    );
}

#[test]
fn test_extract_name_absent_for_bare_address() {
    assert_eq!(extract_name("john@example.com"), None);
    assert_eq!(extract_name("<john@example.com>"), None);
}

// ============================================================================
// Field extraction
// ============================================================================

#[test]
fn test_message_id_key_variants() {
    let first = normalize(&payload(json!({"MessageID": "<a@mj>"})));
    assert_eq!(first.message_id.as_deref(), Some("<a@mj>"));

    let second = normalize(&payload(json!({"Message-Id": "<b@mj>"})));
    assert_eq!(second.message_id.as_deref(), Some("<b@mj>"));

    // First variant wins when both are present.
    let both = normalize(&payload(json!({"MessageID": "<a@mj>", "Message-Id": "<b@mj>"})));
    assert_eq!(both.message_id.as_deref(), Some("<a@mj>"));
}

#[test]
fn test_in_reply_to_key_variants() {
    let email = normalize(&payload(json!({"In-Reply-To": "<parent@mj>"})));
    assert_eq!(email.in_reply_to.as_deref(), Some("<parent@mj>"));
}

#[test]
fn test_references_whitespace_split() {
    let email = normalize(&payload(json!({
        "References": "  <a@mj>   <b@mj>\n<c@mj> "
    })));
    assert_eq!(email.references, vec!["<a@mj>", "<b@mj>", "<c@mj>"]);
}

#[test]
fn test_references_absent_is_empty() {
    let email = normalize(&payload(json!({})));
    assert!(email.references.is_empty());
}

#[test]
fn test_cc_comma_split_with_mixed_forms() {
    let email = normalize(&payload(json!({
        "Cc": "Alice <alice@x.com>, bob@x.com , , \"C\" <c@x.com>"
    })));
    assert_eq!(email.cc_emails, vec!["alice@x.com", "bob@x.com", "c@x.com"]);
}

#[test]
fn test_text_and_html_part_variants() {
    let hyphenated = normalize(&payload(json!({
        "Text-part": "plain", "Html-part": "<p>hi</p>"
    })));
    assert_eq!(hyphenated.text_body.as_deref(), Some("plain"));
    assert_eq!(hyphenated.html_body.as_deref(), Some("<p>hi</p>"));

    let camel = normalize(&payload(json!({
        "TextPart": "plain2", "HtmlPart": "<p>ho</p>"
    })));
    assert_eq!(camel.text_body.as_deref(), Some("plain2"));
    assert_eq!(camel.html_body.as_deref(), Some("<p>ho</p>"));
}

#[test]
fn test_headers_as_json_encoded_string() {
    let email = normalize(&payload(json!({
        "Headers": "{\"Received\":\"by relay\",\"X-Spam\":\"no\"}"
    })));
    assert_eq!(email.headers.get("Received"), Some(&json!("by relay")));
    assert_eq!(email.headers.get("X-Spam"), Some(&json!("no")));
}

#[test]
fn test_headers_as_structured_map() {
    let email = normalize(&payload(json!({
        "Headers": {"Received": ["hop1", "hop2"]}
    })));
    assert_eq!(email.headers.get("Received"), Some(&json!(["hop1", "hop2"])));
}

#[test]
fn test_headers_invalid_json_string_is_empty() {
    let email = normalize(&payload(json!({"Headers": "{broken"})));
    assert!(email.headers.is_empty());
}

#[test]
fn test_headers_unexpected_shape_is_empty() {
    let email = normalize(&payload(json!({"Headers": 42})));
    assert!(email.headers.is_empty());
}

#[test]
fn test_attachments_key_variants() {
    let email = normalize(&payload(json!({
        "Attachments": [
            {"Filename": "a.pdf", "ContentType": "application/pdf", "Size": 1200, "ContentID": "cid-1"},
            {"filename": "b.png", "content_type": "image/png", "size": 88, "content_id": "cid-2"},
            {}
        ]
    })));

    assert_eq!(email.attachments.len(), 3);
    assert_eq!(email.attachments[0].filename.as_deref(), Some("a.pdf"));
    assert_eq!(email.attachments[0].size, Some(1200));
    assert_eq!(email.attachments[1].content_type.as_deref(), Some("image/png"));
    assert_eq!(email.attachments[1].content_id.as_deref(), Some("cid-2"));
    assert_eq!(email.attachments[2], AttachmentMeta::default());
}

#[test]
fn test_attachments_non_array_is_empty() {
    let email = normalize(&payload(json!({"Attachments": "nope"})));
    assert!(email.attachments.is_empty());
}

// ============================================================================
// Whole-record properties
// ============================================================================

#[test]
fn test_representative_inbound_payload() {
    let email = normalize(&payload(json!({
        "MessageID": "<a@mj>",
        "From": "John <john@x.com>",
        "To": "s@acme.inbound.x",
        "Subject": "Help",
        "Text-part": "help"
    })));

    assert_eq!(email.message_id.as_deref(), Some("<a@mj>"));
    assert_eq!(email.from_email.as_deref(), Some("john@x.com"));
    assert_eq!(email.from_name.as_deref(), Some("John"));
    assert_eq!(email.to_email.as_deref(), Some("s@acme.inbound.x"));
    assert_eq!(email.subject.as_deref(), Some("Help"));
    assert_eq!(email.text_body.as_deref(), Some("help"));
}

#[test]
fn test_normalize_is_deterministic() {
    let raw = payload(json!({
        "MessageID": "<a@mj>",
        "From": "John <john@x.com>",
        "Headers": "{\"X\":\"1\"}"
    }));

    assert_eq!(normalize(&raw), normalize(&raw));
}

#[test]
fn test_raw_payload_round_trips() {
    let raw = payload(json!({
        "MessageID": "<a@mj>",
        "Subject": "Round trip",
        "Attachments": [{"Filename": "a.txt"}]
    }));

    let email = normalize(&raw);
    let restored: Value = serde_json::from_str(&email.raw_payload).unwrap();
    assert_eq!(restored, Value::Object(raw));
}

#[test]
fn test_empty_payload_degrades_to_no_values() {
    let email = normalize(&Map::new());

    assert!(email.message_id.is_none());
    assert!(email.from_email.is_none());
    assert!(email.from_name.is_none());
    assert!(email.to_email.is_none());
    assert!(email.subject.is_none());
    assert!(email.cc_emails.is_empty());
    assert!(email.headers.is_empty());
    assert!(email.attachments.is_empty());
    assert_eq!(email.raw_payload, "{}");
}
