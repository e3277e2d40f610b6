//! # Body Parser Module
//!
//! Interprets the envelope's opaque body according to its declared content
//! type. The result is always a flat JSON object so the normalizer has
//! something to work with regardless of how the provider encoded the
//! request.

use serde_json::{Map, Value};

/// Errors for bodies whose declared content type could not be honored
///
/// Only a body *declared* as JSON can fail to parse. Undeclared bodies fall
/// back to a single `Text-part` field and never error.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("Request body is not valid JSON")]
    Json(#[source] serde_json::Error),

    #[error("Request body is not a JSON object")]
    NotAnObject,
}

impl BodyError {
    /// Parse problem category, without raw parser internals
    pub fn category_message(&self) -> String {
        self.to_string()
    }
}

/// Parse a raw body into a string-keyed JSON object
///
/// - Empty or absent body yields an empty object.
/// - A content type indicating JSON parses strictly; failure propagates as
///   [`BodyError`] so the caller can report invalid input.
/// - A content type indicating form-url-encoding decodes into a flat map of
///   string values.
/// - Anything else attempts JSON first and falls back to
///   `{"Text-part": <raw body>}`, which cannot fail.
pub fn parse_body(
    body: Option<&str>,
    content_type: Option<&str>,
) -> Result<Map<String, Value>, BodyError> {
    let raw = match body {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Map::new()),
    };

    let declared = content_type.map(|ct| ct.to_ascii_lowercase());

    match declared.as_deref() {
        Some(ct) if ct.contains("json") => parse_json_object(raw),
        Some(ct) if ct.contains("x-www-form-urlencoded") => Ok(parse_form(raw)),
        _ => Ok(parse_json_object(raw).unwrap_or_else(|_| text_fallback(raw))),
    }
}

/// Strict JSON parse requiring an object at the top level
fn parse_json_object(raw: &str) -> Result<Map<String, Value>, BodyError> {
    match serde_json::from_str::<Value>(raw).map_err(BodyError::Json)? {
        Value::Object(map) => Ok(map),
        _ => Err(BodyError::NotAnObject),
    }
}

/// Decode form-url-encoded pairs into a flat string map
fn parse_form(raw: &str) -> Map<String, Value> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Last-resort mapping: treat the whole body as the text part
fn text_fallback(raw: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("Text-part".to_string(), Value::String(raw.to_string()));
    map
}

#[cfg(test)]
#[path = "body_tests.rs"]
mod tests;
