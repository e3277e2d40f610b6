//! # Payload Normalizer Module
//!
//! Maps the provider's semi-structured parse payload onto the canonical
//! inbound email record the host platform ingests.
//!
//! The provider payload uses mixed-case keys and carries two historical
//! spelling variants for several fields (`MessageID` vs `Message-Id`,
//! `Text-part` vs `TextPart`, ...); both are checked, first match wins.
//! Normalization is pure and total: malformed or missing fields degrade to
//! "no value", never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Core Types
// ============================================================================

/// Attachment descriptor extracted from the provider payload
///
/// No field is required; absence means the provider did not report it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// Canonical inbound email record
///
/// Absent fields serialize as absent rather than as empty strings so
/// downstream consumers can distinguish "not provided" from "provided but
/// empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,

    pub references: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,

    pub cc_emails: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,

    pub headers: Map<String, Value>,

    pub attachments: Vec<AttachmentMeta>,

    /// The parsed provider payload re-serialized as JSON text, for audit
    pub raw_payload: String,
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a parsed provider payload into the canonical record
///
/// Pure and deterministic; repeated calls on the same input produce the
/// same output.
pub fn normalize(raw: &Map<String, Value>) -> InboundEmail {
    let from = string_field(raw, &["From"]);

    InboundEmail {
        message_id: string_field(raw, &["MessageID", "Message-Id"]),
        in_reply_to: string_field(raw, &["InReplyTo", "In-Reply-To"]),
        references: split_references(string_field(raw, &["References"]).as_deref()),
        from_email: from.as_deref().and_then(extract_email),
        from_name: from.as_deref().and_then(extract_name),
        to_email: string_field(raw, &["To"]).as_deref().and_then(extract_email),
        cc_emails: split_cc(string_field(raw, &["Cc"]).as_deref()),
        subject: string_field(raw, &["Subject"]),
        text_body: string_field(raw, &["Text-part", "TextPart"]),
        html_body: string_field(raw, &["Html-part", "HtmlPart"]),
        headers: headers_field(raw.get("Headers")),
        attachments: attachments_field(raw.get("Attachments")),
        raw_payload: serde_json::to_string(&Value::Object(raw.clone())).unwrap_or_default(),
    }
}

/// First string value found among the given key variants
fn string_field(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| raw.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Whitespace-split a `References` header into individual ids
fn split_references(value: Option<&str>) -> Vec<String> {
    value
        .map(|refs| {
            refs.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

/// Comma-split a `Cc` header and extract the address from each entry
fn split_cc(value: Option<&str>) -> Vec<String> {
    value
        .map(|cc| cc.split(',').filter_map(extract_email).collect::<Vec<_>>())
        .unwrap_or_default()
}

/// Interpret the `Headers` field as a structured map
///
/// Accepts either a JSON-encoded string or an already-structured object.
/// Invalid JSON, a non-object JSON string, or any other shape yields an
/// empty map.
fn headers_field(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Extract attachment descriptors from the `Attachments` field
fn attachments_field(value: Option<&Value>) -> Vec<AttachmentMeta> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| AttachmentMeta {
            filename: entry_string(entry, &["Filename", "filename"]),
            content_type: entry_string(entry, &["ContentType", "content_type"]),
            size: entry_number(entry, &["Size", "size"]),
            content_id: entry_string(entry, &["ContentID", "content_id"]),
        })
        .collect()
}

fn entry_string(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| entry.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn entry_number(entry: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| entry.get(*key))
        .and_then(Value::as_u64)
}

// ============================================================================
// Address Parsing
// ============================================================================

/// Extract the email address from a free-text address string
///
/// `Display Name <email@domain>` yields the enclosed address; a bare
/// address yields the trimmed string. Empty input yields no value.
pub fn extract_email(address: &str) -> Option<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let (Some(open), Some(close)) = (trimmed.find('<'), trimmed.rfind('>')) {
        if open < close {
            let inner = trimmed[open + 1..close].trim();
            if inner.is_empty() {
                return None;
            }
            return Some(inner.to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Extract the display name from a free-text address string
///
/// Only text preceding an angle bracket counts as a name; a single layer of
/// surrounding single or double quotes is stripped.
pub fn extract_name(address: &str) -> Option<String> {
    let trimmed = address.trim();
    let open = trimmed.find('<')?;

    let leading = trimmed[..open].trim();
    if leading.is_empty() {
        return None;
    }

    let unquoted = strip_quotes(leading);
    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// Strip one layer of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
