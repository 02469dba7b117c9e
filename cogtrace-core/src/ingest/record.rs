//! Claude Code JSONL record decoding
//!
//! Each non-blank line of a session log is one JSON object. Only a handful of
//! fields matter for analysis:
//!
//! ```text
//! {"type": "assistant", "timestamp": "2025-01-01T10:00:00Z",
//!  "message": {"content": [{"type": "text", "text": "..."},
//!                          {"type": "tool_use", "name": "Read", "input": {...}}]}}
//! ```
//!
//! Everything else on the record is ignored. Missing fields fall back to
//! defaults via `#[serde(default)]`. The `message` of an assistant record must
//! have the shape above or the whole line fails to decode. User messages of
//! any other shape decode to an empty payload, and the message of any other
//! record type is never looked at.

use crate::types::{Content, Event, EventKind};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

// ============================================
// Raw JSONL record types (serde deserialization)
// ============================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawRecord {
    #[serde(rename = "type")]
    record_type: Option<String>,
    timestamp: Option<String>,
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawMessage {
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input: serde_json::Value,
    },
    // tool_result, image, thinking, ...
    #[serde(other)]
    Unknown,
}

/// Decode one log line into an [`Event`].
///
/// Returns a human-readable reason on failure; the caller attaches the line
/// number and decides whether the failure is fatal.
pub(crate) fn decode_line(line: &str) -> std::result::Result<Event, String> {
    let raw_json: serde_json::Value =
        serde_json::from_str(line).map_err(|e| format!("JSON parse error: {}", e))?;

    if !raw_json.is_object() {
        return Err(format!("expected a JSON object, found {}", json_kind(&raw_json)));
    }

    let record: RawRecord =
        serde_json::from_value(raw_json).map_err(|e| format!("unexpected record shape: {}", e))?;

    let timestamp = match record.timestamp.as_deref() {
        Some(s) => Some(parse_timestamp(s).ok_or_else(|| format!("invalid timestamp {:?}", s))?),
        None => None,
    };

    let kind = EventKind::from_record_type(record.record_type.as_deref());
    let payload = match (kind, record.message) {
        (EventKind::Other, _) | (_, None) => Vec::new(),
        (EventKind::Assistant, Some(message)) => {
            let message: RawMessage = serde_json::from_value(message)
                .map_err(|e| format!("unexpected assistant message shape: {}", e))?;
            message.content.map(content_items).unwrap_or_default()
        }
        (EventKind::User, Some(message)) => serde_json::from_value::<RawMessage>(message)
            .ok()
            .and_then(|m| m.content)
            .map(content_items)
            .unwrap_or_default(),
    };

    Ok(Event::new(kind, timestamp, payload))
}

fn content_items(content: RawContent) -> Vec<Content> {
    match content {
        RawContent::Text(text) => vec![Content::Text { body: text }],
        RawContent::Blocks(blocks) => blocks
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(Content::Text { body: text }),
                ContentBlock::ToolUse { name, input } => Some(Content::tool_with(
                    name.unwrap_or_else(|| "unknown".to_string()),
                    input,
                )),
                ContentBlock::Unknown => None,
            })
            .collect(),
    }
}

/// Parse an ISO-8601 timestamp.
///
/// A trailing `Z` is UTC; explicit offsets are honoured; timestamps without
/// any offset are taken as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
