use serde_json::{Map, Value};
use tracing::trace;

use super::sanitizer::sanitize;

/// Known JSON layouts a generative backend may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"choices":[{"delta":{"content": ...}}]}`
    ChatDelta,
    /// `{"choices":[{"message":{"content": ...}}]}`
    ChatMessage,
    /// `{"message":{"content": ...}}`
    Message,
    /// `{"response": ...}`
    Response,
}

/// One entry of an ordered extraction table.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorRule {
    pub shape: Shape,
    pub extract: fn(&Value) -> Option<&Value>,
}

/// Rules applied to each streamed line. Order is the tie-break.
pub const STREAM_RULES: [ExtractorRule; 3] = [
    ExtractorRule {
        shape: Shape::ChatDelta,
        extract: chat_delta_content,
    },
    ExtractorRule {
        shape: Shape::Message,
        extract: message_content,
    },
    ExtractorRule {
        shape: Shape::Response,
        extract: response_field,
    },
];

/// Rules applied to a buffered, non-streamed response body.
pub const COMPLETE_RULES: [ExtractorRule; 3] = [
    ExtractorRule {
        shape: Shape::ChatMessage,
        extract: chat_message_content,
    },
    ExtractorRule {
        shape: Shape::Message,
        extract: message_content,
    },
    ExtractorRule {
        shape: Shape::Response,
        extract: response_field,
    },
];

fn chat_delta_content(payload: &Value) -> Option<&Value> {
    payload.get("choices")?.get(0)?.get("delta")?.get("content")
}

fn chat_message_content(payload: &Value) -> Option<&Value> {
    payload.get("choices")?.get(0)?.get("message")?.get("content")
}

fn message_content(payload: &Value) -> Option<&Value> {
    payload.get("message")?.get("content")
}

fn response_field(payload: &Value) -> Option<&Value> {
    payload.get("response")
}

/// Parse candidate payload text. Anything that is not JSON becomes an empty
/// object: "no content here" rather than an error.
pub fn parse_payload(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Render an extracted value as display text, or `None` when it is falsy
/// (null, `false`, zero, empty string).
pub fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Run `rules` in order against `payload`; the first truthy result wins.
pub fn extract_with(rules: &[ExtractorRule], payload: &Value) -> Option<(Shape, String)> {
    rules.iter().find_map(|rule| {
        (rule.extract)(payload)
            .and_then(truthy_text)
            .map(|text| (rule.shape, text))
    })
}

/// Pull the incremental text out of one raw stream line.
///
/// Never fails: framing-only lines, non-JSON text and unknown shapes all
/// yield an empty string.
pub fn extract_chunk(raw_line: &str) -> String {
    let payload_text = sanitize(raw_line);
    if payload_text.trim().is_empty() {
        return String::new();
    }

    let payload = parse_payload(payload_text);
    match extract_with(&STREAM_RULES, &payload) {
        Some((shape, text)) => {
            trace!(?shape, len = text.len(), "Extracted stream delta");
            text
        }
        None => String::new(),
    }
}
